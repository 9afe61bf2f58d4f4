//! Script runner

use super::dispatch::DispatchContext;
use super::recorder::{ResultRecorder, RunSummary};
use super::script::ScriptReader;
use crate::rpc::RpcClient;
use crate::utils::error::Result;
use std::io::{BufRead, Write};
use tracing::info;

/// Runs scripts against one client
pub struct ScriptRunner<'c, C: RpcClient + ?Sized> {
    client: &'c C,
}

impl<'c, C: RpcClient + ?Sized> ScriptRunner<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self { client }
    }

    /// Execute every directive in `input`, writing one record per call to
    /// `output`
    ///
    /// Calls run strictly in script order. Records already written stay in
    /// `output` when the run stops on an error.
    pub async fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<RunSummary> {
        let mut ctx = DispatchContext::new(self.client, ResultRecorder::new(output));

        for line in ScriptReader::new(input) {
            let line = line?;
            ctx.apply(line.number, line.directive).await?;
        }

        let mut recorder = ctx.finish()?;
        recorder.flush()?;

        let summary = recorder.summary();
        info!(
            calls = summary.calls,
            ok = summary.ok,
            rpc_err = summary.rpc_err,
            err = summary.err,
            batches = summary.batches,
            "Script completed"
        );
        Ok(summary)
    }
}
