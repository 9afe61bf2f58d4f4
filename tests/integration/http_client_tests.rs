//! HTTP client integration tests
//!
//! Scripts run against a mock JSON-RPC calculator served by wiremock.

#[cfg(test)]
mod tests {
    use crate::common::{CalcServer, run_script};
    use crate::{assert_err, assert_ok};
    use rpc_conform::config::EndpointConfig;
    use rpc_conform::rpc::{HttpRpcClient, RpcClient, RpcClientError};
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn calc_server(responder: CalcServer) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(responder)
            .mount(&server)
            .await;
        server
    }

    async fn connect(server: &MockServer) -> HttpRpcClient {
        assert_ok!(HttpRpcClient::connect(&EndpointConfig::new(server.uri())).await)
    }

    async fn request_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    // ==================== Contract ====================

    #[tokio::test]
    async fn test_connect_loads_contract() {
        let server = calc_server(CalcServer::default()).await;
        let client = connect(&server).await;

        let contract = client.contract().unwrap();
        assert_eq!(contract.interface_names(), vec!["Calc"]);
        assert_eq!(contract.function_count(), 4);
        assert_eq!(contract.checksum(), Some("calc-checksum"));

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["method"], "barrister-idl");
        assert_eq!(bodies[0]["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn test_connect_fails_on_idl_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": "Method not found"},
                "id": null
            })))
            .mount(&server)
            .await;

        let err = assert_err!(HttpRpcClient::connect(&EndpointConfig::new(server.uri())).await);
        assert_eq!(err.remote_code(), Some(&json!(-32601)));
    }

    // ==================== Single calls ====================

    #[tokio::test]
    async fn test_invoke_sends_qualified_method() {
        let server = calc_server(CalcServer::default()).await;
        let client = connect(&server).await;

        let result = client.invoke("Calc", "add", vec![json!(1), json!(2)]).await;
        assert_eq!(assert_ok!(result), json!(3));

        let bodies = request_bodies(&server).await;
        let call = &bodies[1];
        assert_eq!(call["method"], "Calc.add");
        assert_eq!(call["params"], json!([1, 2]));
        assert!(call["id"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_function_not_sent() {
        let server = calc_server(CalcServer::default()).await;
        let client = connect(&server).await;

        let err = assert_err!(client.invoke("Calc", "pow", vec![json!(2)]).await);
        assert!(matches!(err, RpcClientError::UnknownFunction { .. }));
        assert_eq!(request_bodies(&server).await.len(), 1);
    }

    #[tokio::test]
    async fn test_script_single_calls() {
        let server = calc_server(CalcServer::default()).await;
        let client = connect(&server).await;

        let script = "Calc|add|[1,2]|ok|3\nCalc|divide|[1,0]|rpcErr|1000\nCalc|pow|[2,2]|ok|4\n";
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!((summary.ok, summary.rpc_err, summary.err), (1, 1, 1));
        assert_eq!(
            out,
            "Calc|add|[1,2]|ok|3\nCalc|divide|[1,0]|rpcErr|1000\nCalc|pow|[2,2]|err|\"\"\n"
        );
    }

    /// Without a contract, name checking is left to the server
    #[tokio::test]
    async fn test_without_contract_server_rejects_unknown() {
        let server = calc_server(CalcServer::default()).await;
        let config = EndpointConfig::new(server.uri()).without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);

        let (result, out) = run_script(&client, "Calc|pow|[2,2]|ok|4\n").await;
        assert_ok!(result);
        assert_eq!(out, "Calc|pow|[2,2]|rpcErr|-32601\n");
    }

    // ==================== Remote error codes ====================

    /// Symbolic and out-of-range codes are still remote errors
    #[tokio::test]
    async fn test_non_integer_codes_single_calls() {
        for (code, expected) in [
            (json!("E_DIV"), "Calc|divide|[1,0]|rpcErr|\"E_DIV\"\n"),
            (json!(3000000000u64), "Calc|divide|[1,0]|rpcErr|3000000000\n"),
            (json!(1000), "Calc|divide|[1,0]|rpcErr|1000\n"),
        ] {
            let server = calc_server(CalcServer::default().with_divide_code(code)).await;
            let client = connect(&server).await;

            let (result, out) = run_script(&client, "Calc|divide|[1,0]|rpcErr|E\n").await;
            let summary = assert_ok!(result);
            assert_eq!(summary.rpc_err, 1);
            assert_eq!(out, expected);
        }
    }

    /// One symbolic code does not spoil the rest of the batch
    #[tokio::test]
    async fn test_non_integer_codes_in_batch() {
        for (code, encoded) in [(json!("E_DIV"), "\"E_DIV\""), (json!(3000000000u64), "3000000000")] {
            let server = calc_server(CalcServer::reversed().with_divide_code(code)).await;
            let client = connect(&server).await;

            let script = "start_batch\nCalc|add|[1,1]|ok|2\nCalc|divide|[1,0]|rpcErr|E\nCalc|add|[2,2]|ok|4\nend_batch\n";
            let (result, out) = run_script(&client, script).await;
            let summary = assert_ok!(result);
            assert_eq!((summary.ok, summary.rpc_err, summary.err), (2, 1, 0));
            assert_eq!(
                out,
                format!(
                    "Calc|add|[1,1]|ok|2\nCalc|divide|[1,0]|rpcErr|{}\nCalc|add|[2,2]|ok|4\n",
                    encoded
                )
            );
        }
    }

    #[tokio::test]
    async fn test_configured_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-suite", "conform"))
            .respond_with(CalcServer::default())
            .mount(&server)
            .await;

        let config = EndpointConfig::new(server.uri())
            .with_header("X-Suite", "conform")
            .without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);
        let result = client.invoke("Calc", "add", vec![json!(2), json!(2)]).await;
        assert_eq!(assert_ok!(result), json!(4));
    }

    // ==================== Batches ====================

    /// Responses returned in reverse still land on their calls
    #[tokio::test]
    async fn test_batch_reversed_responses() {
        let server = calc_server(CalcServer::reversed()).await;
        let client = connect(&server).await;

        let script = "\
start_batch
Calc|add|[1,1]|ok|2
Calc|subtract|[10,3]|ok|7
Calc|divide|[1,0]|rpcErr|1000
end_batch
";
        let (result, out) = run_script(&client, script).await;
        assert_ok!(result);
        assert_eq!(
            out,
            "Calc|add|[1,1]|ok|2\nCalc|subtract|[10,3]|ok|7\nCalc|divide|[1,0]|rpcErr|1000\n"
        );

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 2);
        let batch = bodies[1].as_array().unwrap();
        assert_eq!(batch.len(), 3);
        let methods: Vec<&str> = batch.iter().map(|r| r["method"].as_str().unwrap()).collect();
        assert_eq!(methods, vec!["Calc.add", "Calc.subtract", "Calc.divide"]);
    }

    /// A name missing from the contract is recorded without reaching the server
    #[tokio::test]
    async fn test_batch_with_unknown_function() {
        let server = calc_server(CalcServer::reversed()).await;
        let client = connect(&server).await;

        let script = "start_batch\nCalc|add|[1,1]|ok|2\nCalc|pow|[2,2]|ok|4\nCalc|add|[2,2]|ok|4\nend_batch\n";
        let (result, out) = run_script(&client, script).await;
        assert_ok!(result);
        assert_eq!(
            out,
            "Calc|add|[1,1]|ok|2\nCalc|pow|[2,2]|err|\"\"\nCalc|add|[2,2]|ok|4\n"
        );

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[1].as_array().unwrap().len(), 2);
    }

    /// An empty batch makes no request
    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = calc_server(CalcServer::default()).await;
        let client = connect(&server).await;

        let (result, out) = run_script(&client, "start_batch\nend_batch\n").await;
        assert_ok!(result);
        assert!(out.is_empty());
        assert_eq!(request_bodies(&server).await.len(), 1);
    }

    /// A response set missing one call cannot be aligned
    #[tokio::test]
    async fn test_batch_short_response_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let config = EndpointConfig::new(server.uri()).without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);

        let script = "Calc|add|[1,1]|ok|2\nstart_batch\nCalc|add|[2,2]|ok|4\nend_batch\n";
        let (result, _) = run_script(&client, script).await;
        assert!(assert_err!(result).to_string().contains("Batch protocol violation"));
    }

    // ==================== Transport failures ====================

    /// HTTP failures are recorded as err and the run goes on
    #[tokio::test]
    async fn test_http_error_status_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let config = EndpointConfig::new(server.uri()).without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);

        let script = "Calc|add|[1,1]|ok|2\nstart_batch\nCalc|add|[2,2]|ok|4\nCalc|add|[3,3]|ok|6\nend_batch\n";
        let (result, out) = run_script(&client, script).await;
        let summary = assert_ok!(result);
        assert_eq!(summary.err, 3);
        assert_eq!(
            out,
            "Calc|add|[1,1]|err|\"\"\nCalc|add|[2,2]|err|\"\"\nCalc|add|[3,3]|err|\"\"\n"
        );
    }

    #[tokio::test]
    async fn test_invalid_json_response_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let config = EndpointConfig::new(server.uri()).without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);
        let err = assert_err!(client.invoke("Calc", "add", vec![]).await);
        assert!(matches!(err, RpcClientError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_err() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let config = EndpointConfig::new(uri).with_timeout(2_000).without_contract();
        let client = assert_ok!(HttpRpcClient::connect(&config).await);

        let (result, out) = run_script(&client, "Calc|add|[1,1]|ok|2\n").await;
        assert_ok!(result);
        assert_eq!(out, "Calc|add|[1,1]|err|\"\"\n");
    }
}
