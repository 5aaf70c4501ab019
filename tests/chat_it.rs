// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use assist_gateway::{
	_preludet::*,
	auth::SecretString,
	chat::{ChatConfig, Completion, FailureCategory, PromptContext, UsageStats},
};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn config(server: &MockServer) -> ChatConfig {
	let endpoint = Url::parse(&server.url(COMPLETIONS_PATH))
		.expect("Mock completion endpoint URL should parse successfully.");

	test_chat_config(endpoint)
}

fn context() -> PromptContext {
	PromptContext::new("You help visitors plan a move.")
}

fn success_body() -> serde_json::Value {
	serde_json::json!({
		"model": "test-model-0125",
		"choices": [{ "message": { "role": "assistant", "content": "  We can help!  " } }],
		"usage": { "prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24 }
	})
}

fn category_of(completion: &Completion) -> Option<FailureCategory> {
	match completion {
		Completion::Success { .. } => None,
		Completion::Failure { category, .. } => Some(*category),
	}
}

#[tokio::test]
async fn successful_exchange_returns_trimmed_content_and_usage() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(COMPLETIONS_PATH)
				.header("authorization", "Bearer test-api-key")
				.json_body_includes(r#"{ "model": "test-model", "temperature": 0.7 }"#);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(success_body());
		})
		.await;
	let client = build_test_chat_client(config(&server));
	let completion = client.generate("How much for a two-bedroom flat?", &context()).await;
	let Completion::Success { content, usage, model, .. } = completion else {
		panic!("Stubbed upstream success must yield a success value.");
	};

	assert_eq!(content, "We can help!");
	assert_eq!(
		usage,
		Some(UsageStats { prompt_tokens: 20, completion_tokens: 4, total_tokens: 24 }),
	);
	assert_eq!(model, "test-model-0125");

	mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_of_two_stops_the_third_sequential_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(success_body());
		})
		.await;
	let client = build_test_chat_client(config(&server).with_rate_limit(2));

	assert!(client.generate("first", &context()).await.is_success());
	assert!(client.generate("second", &context()).await.is_success());

	let third = client.generate("third", &context()).await;

	assert_eq!(category_of(&third), Some(FailureCategory::RateLimited));

	// The denied attempt must not reach the upstream service.
	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn placeholder_api_key_fails_without_any_network_call() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(success_body());
		})
		.await;
	let mut config = config(&server);

	config.api_key = SecretString::new("your-api-key");

	let client = build_test_chat_client(config);
	let completion = client.generate("hello", &context()).await;

	assert_eq!(category_of(&completion), Some(FailureCategory::ConfigurationError));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn upstream_slower_than_the_deadline_is_a_timeout() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(success_body())
				.delay(Duration::from_millis(800));
		})
		.await;
	let client = build_test_chat_client(config(&server).with_timeout(Duration::from_millis(100)));
	let completion = client.generate("hello", &context()).await;

	assert_eq!(category_of(&completion), Some(FailureCategory::Timeout));
}

#[tokio::test]
async fn non_success_status_is_an_upstream_error_with_detail() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(500)
				.header("content-type", "application/json")
				.body(r#"{ "error": { "message": "internal" } }"#);
		})
		.await;
	let client = build_test_chat_client(config(&server));
	let completion = client.generate("hello", &context()).await;
	let Completion::Failure { category, detail, user_message, .. } = completion else {
		panic!("Upstream 500 must yield a failure value.");
	};

	assert_eq!(category, FailureCategory::UpstreamError);
	assert_eq!(user_message, FailureCategory::UpstreamError.user_message());

	let detail = detail.expect("Upstream failures must capture detail for operator logs.");

	assert!(detail.contains("500"));
	assert!(detail.contains("internal"), "Raw upstream detail belongs in the detail field.");
}

#[tokio::test]
async fn empty_choices_list_is_a_malformed_response() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "model": "test-model", "choices": [] }));
		})
		.await;
	let client = build_test_chat_client(config(&server));
	let completion = client.generate("hello", &context()).await;

	assert_eq!(category_of(&completion), Some(FailureCategory::MalformedResponse));
}

#[tokio::test]
async fn whitespace_only_content_is_a_malformed_response() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"choices": [{ "message": { "role": "assistant", "content": "   " } }]
				}),
			);
		})
		.await;
	let client = build_test_chat_client(config(&server));
	let completion = client.generate("hello", &context()).await;

	assert_eq!(category_of(&completion), Some(FailureCategory::MalformedResponse));
}

#[tokio::test]
async fn failed_calls_do_not_consume_the_rate_budget() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path(COMPLETIONS_PATH);
			then.status(503).body("overloaded");
		})
		.await;
	let client = build_test_chat_client(config(&server).with_rate_limit(1));

	for _ in 0..3 {
		let completion = client.generate("hello", &context()).await;

		// Only successes are recorded against the window, so retries stay possible.
		assert_eq!(category_of(&completion), Some(FailureCategory::UpstreamError));
	}
}
