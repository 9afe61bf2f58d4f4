//! Script execution engine
//!
//! The engine reads a script, executes each call through an
//! [`RpcClient`](crate::rpc::RpcClient) and writes one record per call:
//!
//! - [`script`]: line parsing into directives
//! - [`dispatch`]: routing of directives to immediate calls or the open batch
//! - [`batch`]: queued calls and their positional correlation on flush
//! - [`recorder`]: outcome classification and the result stream
//! - [`runner`]: the loop tying them together

pub mod batch;
pub mod dispatch;
pub mod recorder;
pub mod runner;
pub mod script;

pub use batch::PendingBatch;
pub use dispatch::DispatchContext;
pub use recorder::{CallOutcome, CallStatus, ResultRecord, ResultRecorder, RunSummary};
pub use runner::ScriptRunner;
pub use script::{CallDescriptor, Expectation, ParseError, ScriptDirective, ScriptReader, parse_line};
