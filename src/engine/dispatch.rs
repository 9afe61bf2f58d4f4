//! Directive dispatch
//!
//! Holds the only mutable run state: the result recorder and the batch that
//! is currently open, if any.

use super::batch::PendingBatch;
use super::recorder::{ResultRecorder, RunSummary};
use super::script::{CallDescriptor, ParseError, ScriptDirective};
use crate::rpc::RpcClient;
use crate::utils::error::{ConformError, Result};
use std::io::Write;
use tracing::{debug, warn};

/// Routes directives to immediate execution or to the open batch
pub struct DispatchContext<'c, C: RpcClient + ?Sized, W: Write> {
    client: &'c C,
    recorder: ResultRecorder<W>,
    batch: Option<PendingBatch>,
}

impl<'c, C: RpcClient + ?Sized, W: Write> DispatchContext<'c, C, W> {
    pub fn new(client: &'c C, recorder: ResultRecorder<W>) -> Self {
        Self {
            client,
            recorder,
            batch: None,
        }
    }

    /// Whether a batch is open
    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Apply the directive found on script line `line`
    pub async fn apply(&mut self, line: usize, directive: ScriptDirective) -> Result<()> {
        match directive {
            ScriptDirective::StartBatch => {
                if self.batch.is_some() {
                    return Err(ConformError::parse(line, ParseError::NestedBatch));
                }
                debug!(line, "Opening batch");
                self.batch = Some(PendingBatch::open(self.client, line));
            }
            ScriptDirective::EndBatch => {
                let batch = self
                    .batch
                    .take()
                    .ok_or_else(|| ConformError::parse(line, ParseError::UnmatchedEndBatch))?;
                if batch.is_empty() {
                    warn!(line, opened_at = batch.opened_at(), "Empty batch");
                }
                debug!(line, calls = batch.len(), "Closing batch");
                batch.flush(&mut self.recorder).await?;
                self.recorder.note_batch();
            }
            ScriptDirective::Call(call) => {
                if let Some(batch) = self.batch.as_mut() {
                    debug!(line, interface = %call.interface, method = %call.method, "Queueing call");
                    batch.enqueue(call);
                } else {
                    self.invoke(line, call).await?;
                }
            }
        }
        Ok(())
    }

    async fn invoke(&mut self, line: usize, call: CallDescriptor) -> Result<()> {
        debug!(line, interface = %call.interface, method = %call.method, "Invoking call");
        let CallDescriptor {
            interface,
            method,
            arguments,
            arguments_encoded,
            ..
        } = call;

        let client = self.client;
        self.recorder
            .execute(
                &interface,
                &method,
                &arguments_encoded,
                client.invoke(&interface, &method, arguments),
            )
            .await?;
        Ok(())
    }

    /// Counters so far
    pub fn summary(&self) -> RunSummary {
        self.recorder.summary()
    }

    /// End the run; an open batch at this point is an error
    pub fn finish(self) -> Result<ResultRecorder<W>> {
        match self.batch {
            Some(batch) => {
                let opened_at = batch.opened_at();
                Err(ConformError::parse(
                    opened_at,
                    ParseError::UnterminatedBatch { opened_at },
                ))
            }
            None => Ok(self.recorder),
        }
    }
}
