//! Engine integration tests
//!
//! Whole scripts against the in-process calculator.

#[cfg(test)]
mod tests {
    use crate::common::{calc_client, run_script};
    use crate::{assert_err, assert_ok};
    use rpc_conform::engine::ParseError;
    use rpc_conform::rpc::ResponseOrder;
    use rpc_conform::{CallStatus, ConformError};

    fn lines(out: &str) -> Vec<&str> {
        out.lines().collect()
    }

    fn status(line: &str) -> CallStatus {
        assert_ok!(line.split('|').nth(3).unwrap_or_default().parse::<CallStatus>())
    }

    // ==================== Records ====================

    /// The canonical example line comes back unchanged
    #[tokio::test]
    async fn test_single_ok_call() {
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, "Calc|add|[1,2]|ok|3\n").await;
        assert_ok!(result);
        assert_eq!(out, "Calc|add|[1,2]|ok|3\n");
    }

    /// One record per call line, none for comments or directives
    #[tokio::test]
    async fn test_one_record_per_call() {
        let script = "\
# header comment
Calc|add|[1,2]|ok|3

start_batch
Calc|subtract|[5,3]|ok|2
# comment inside a batch
Calc|divide|[8,2]|ok|4
end_batch
Calc|echo|[\"hi\"]|ok|\"hi\"
";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!(summary.calls, 4);
        assert_eq!(summary.batches, 1);
        assert_eq!(lines(&out).len(), 4);
    }

    /// Records follow script order, batched calls flattened in place
    #[tokio::test]
    async fn test_records_follow_script_order() {
        let script = "\
Calc|add|[1,1]|ok|2
start_batch
Calc|add|[2,2]|ok|4
Calc|add|[3,3]|ok|6
Calc|add|[4,4]|ok|8
end_batch
Calc|add|[5,5]|ok|10
";
        let client = calc_client(ResponseOrder::Reversed);
        let (result, out) = run_script(&client, script).await;
        assert_ok!(result);
        assert_eq!(
            lines(&out),
            vec![
                "Calc|add|[1,1]|ok|2",
                "Calc|add|[2,2]|ok|4",
                "Calc|add|[3,3]|ok|6",
                "Calc|add|[4,4]|ok|8",
                "Calc|add|[5,5]|ok|10",
            ]
        );
    }

    /// Remote errors record their code
    #[tokio::test]
    async fn test_remote_error_records_code() {
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, "Calc|divide|[1,0]|rpcErr|1000\n").await;
        let summary = assert_ok!(result);
        assert_eq!(summary.rpc_err, 1);
        assert_eq!(out, "Calc|divide|[1,0]|rpcErr|1000\n");
    }

    /// Unknown functions are local failures and the run continues
    #[tokio::test]
    async fn test_unknown_function_is_err() {
        let script = "Calc|pow|[2,8]|ok|256\nNope|add|[1,2]|ok|3\nCalc|add|[1,2]|ok|3\n";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!(summary.err, 2);
        assert_eq!(
            lines(&out),
            vec![
                "Calc|pow|[2,8]|err|\"\"",
                "Nope|add|[1,2]|err|\"\"",
                "Calc|add|[1,2]|ok|3",
            ]
        );
    }

    /// Mixed outcomes inside one batch stay in position
    #[tokio::test]
    async fn test_batch_with_mixed_outcomes() {
        let script = "\
start_batch
Calc|divide|[1,0]|rpcErr|1000
Calc|pow|[2,2]|ok|4
Calc|add|[1,2]|ok|3
end_batch
";
        let client = calc_client(ResponseOrder::Reversed);
        let (result, out) = run_script(&client, script).await;
        assert_ok!(result);
        let statuses: Vec<CallStatus> = lines(&out).into_iter().map(status).collect();
        assert_eq!(
            statuses,
            vec![CallStatus::RpcErr, CallStatus::Err, CallStatus::Ok]
        );
    }

    /// The status field is a classification, never copied from the script
    #[tokio::test]
    async fn test_expectation_is_not_echoed() {
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, "Calc|add|[1,2]|rpcErr|99\n").await;
        assert_ok!(result);
        assert_eq!(out, "Calc|add|[1,2]|ok|3\n");
    }

    // ==================== Batches ====================

    #[tokio::test]
    async fn test_empty_batch() {
        let script = "start_batch\nend_batch\nCalc|add|[1,2]|ok|3\n";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!(summary.batches, 1);
        assert_eq!(out, "Calc|add|[1,2]|ok|3\n");
    }

    #[tokio::test]
    async fn test_consecutive_batches() {
        let script = "\
start_batch
Calc|add|[1,2]|ok|3
end_batch
start_batch
Calc|subtract|[1,2]|ok|-1
end_batch
";
        let client = calc_client(ResponseOrder::Reversed);
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!(summary.batches, 2);
        assert_eq!(out, "Calc|add|[1,2]|ok|3\nCalc|subtract|[1,2]|ok|-1\n");
    }

    // ==================== Fatal errors ====================

    /// A malformed line stops the run but keeps earlier records
    #[tokio::test]
    async fn test_bad_line_keeps_partial_output() {
        let script = "Calc|add|[1,2]|ok|3\nCalc|add|not json|ok|3\nCalc|add|[2,2]|ok|4\n";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        let err = assert_err!(result);
        assert!(matches!(
            err,
            ConformError::Parse {
                line: 2,
                source: ParseError::InvalidArguments { .. }
            }
        ));
        assert_eq!(out, "Calc|add|[1,2]|ok|3\n");
    }

    #[tokio::test]
    async fn test_nested_batch_is_fatal() {
        let script = "start_batch\nCalc|add|[1,2]|ok|3\nstart_batch\n";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        let err = assert_err!(result);
        assert_eq!(err.line(), Some(3));
        assert!(err.to_string().contains("already open"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_stray_end_batch_is_fatal() {
        let client = calc_client(ResponseOrder::Submitted);
        let (result, _) = run_script(&client, "Calc|add|[1,2]|ok|3\nend_batch\n").await;
        assert!(matches!(
            assert_err!(result),
            ConformError::Parse {
                line: 2,
                source: ParseError::UnmatchedEndBatch
            }
        ));
    }

    /// Queued calls of an unterminated batch are never sent
    #[tokio::test]
    async fn test_unterminated_batch_is_fatal() {
        let script = "Calc|add|[1,2]|ok|3\nstart_batch\nCalc|add|[2,2]|ok|4\n";
        let client = calc_client(ResponseOrder::Submitted);
        let (result, out) = run_script(&client, script).await;
        assert!(matches!(
            assert_err!(result),
            ConformError::Parse {
                source: ParseError::UnterminatedBatch { opened_at: 2 },
                ..
            }
        ));
        assert_eq!(out, "Calc|add|[1,2]|ok|3\n");
    }
}
