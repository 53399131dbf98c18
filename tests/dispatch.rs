//! Dispatch through the full HTTP middleware stack.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};

use mvc_dispatch::config::parse_config;

mod common;

use common::{get, post_form, router, router_with, send};

#[tokio::test]
async fn test_root_renders_home() {
    let reply = get(&router(), "/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("application/json"));
    assert_eq!(reply.json()["view"], "Index");
}

#[tokio::test]
async fn test_fallback_cannot_reach_directly_routed_actions() {
    let router = router();
    for path in [
        "/Home",
        "/home/index",
        "/HOME/INDEX/7",
        "/TestRouteConstraint/Match/eve",
        "/TestRouteConstraint/CustomRouteConstraint/eve",
        "/TestRouteConstraint/RegularExpressionConstraint",
        "/TestFilter/FilterByGlobalFilter",
    ] {
        let reply = get(&router, path).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[tokio::test]
async fn test_redirect_route() {
    let reply = get(&router(), "/mygithub").await;
    assert_eq!(reply.status, StatusCode::FOUND);
    assert_eq!(reply.header(header::LOCATION), Some("https://github.com/drioemgaoin"));
}

#[tokio::test]
async fn test_ignored_resources_are_not_found() {
    let reply = get(&router(), "/trace.axd/details").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_controller_and_action() {
    let router = router();
    assert_eq!(get(&router, "/Nope").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/Home/Nope").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_regex_constraint() {
    let router = router();
    let reply = get(&router, "/TestRouteConstraint/Regexp/rdiegoni").await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["view"], "Result");
    assert_eq!(body["viewData"]["Message"], "Regular Expression Constraint success");
    assert_eq!(body["viewData"]["User"], "rdiegoni");

    // Rejected by the constraint; the fallback knows no "Regexp" action.
    let reply = get(&router, "/TestRouteConstraint/Regexp/someone").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_custom_match_constraint_is_case_insensitive() {
    let router = router();
    let reply = get(&router, "/TestRouteConstraint/Custom/RDiegoni").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["viewData"]["Message"], "Custom Route Constraint success");

    let reply = get(&router, "/TestRouteConstraint/Custom/someone").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_constraint_on_optional_parameter() {
    let router = router();
    let reply = get(&router, "/TestRouteConstraint/Match/RDIEGONI").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["viewData"]["User"], "RDIEGONI");

    assert_eq!(get(&router, "/TestRouteConstraint/Match/eve").await.status, StatusCode::NOT_FOUND);

    // The attached constraint needs a value to judge.
    let reply = get(&router, "/TestRouteConstraint/Match").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_date_model_binding() {
    let router = router();
    let reply = get(&router, "/TestModelBinding").await;
    assert_eq!(reply.json()["model"]["Date"], serde_json::Value::Null);

    let reply = post_form(&router, "/TestModelBinding", "Day=5&Month=6&Year=2020").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["model"]["Date"], "5/6/2020");

    let reply = post_form(&router, "/TestModelBinding", "Day=5&Year=2020").await;
    assert_eq!(reply.json()["model"]["Date"], "5//2020");
}

#[tokio::test]
async fn test_validation_of_valid_model() {
    let reply = post_form(&router(), "/TestValidation", "Age=30&Name=Bob&HasSalary=false").await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["model"]["Message"], "Server side: Model is valid");
    assert_eq!(body["viewData"]["Errors"], serde_json::json!([]));
}

#[tokio::test]
async fn test_validation_collects_field_errors() {
    let reply = post_form(&router(), "/TestValidation", "Age=abc&Name=Bob7").await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["model"]["Message"], "Server side: Model is not valid");

    let messages: Vec<&str> = body["viewData"]["Errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"The value 'abc' is not valid for Age."));
    assert!(messages.contains(&"The field Age is required."));
    assert!(messages.iter().any(|m| m.contains("Name")));
}

#[tokio::test]
async fn test_validation_of_negative_income_with_salary() {
    let reply = post_form(
        &router(),
        "/TestValidation",
        "Age=30&Name=Bob&HasSalary=true&HasSalary=false&Income=-5",
    )
    .await;
    let body = reply.json();
    assert_eq!(body["model"]["Message"], "Server side: Model is not valid");
    let errors = body["viewData"]["Errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "The field Income cannot be negative");
    assert_eq!(errors[0]["members"], serde_json::json!(["Income"]));
}

#[tokio::test]
async fn test_validation_page_carries_client_rules() {
    let reply = get(&router(), "/TestValidation").await;
    let rules = &reply.json()["viewData"]["ClientRules"];
    assert!(rules.get("Age").is_some());
    assert!(rules.get("Name").is_some());
}

#[tokio::test]
async fn test_value_provider_cookie_round_trip() {
    let router = router();
    let reply = get(&router, "/TestValueProvider").await;
    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.header(header::SET_COOKIE).unwrap();
    assert!(cookie.starts_with("id=3"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/TestValueProvider")
        .header(header::COOKIE, "theme=dark; id=3")
        .body(Body::empty())
        .unwrap();
    let reply = send(&router, request).await;
    assert_eq!(reply.json()["model"]["Id"], "3");
}

#[tokio::test]
async fn test_form_value_wins_over_cookie() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/TestValueProvider")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, "id=3")
        .body(Body::from("id=9"))
        .unwrap();
    let reply = send(&router(), request).await;
    assert_eq!(reply.json()["model"]["Id"], "9");
}

#[tokio::test]
async fn test_xml_action_result() {
    let reply = post_form(&router(), "/TestActionResult", "Message=fish+%26+chips").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.header(header::CONTENT_TYPE), Some("application/xml"));
    let body = reply.text();
    assert!(body.contains("<ResultModel>"));
    assert!(body.contains("<Message>fish &amp; chips</Message>"));
}

#[tokio::test]
async fn test_filter_actions() {
    let router = router();
    for action in [
        "FilterByOverrideMethod",
        "FilterByCustomActionFilterAttribute",
        "FilterByFilterProvider",
        "FilterByGlobalFilter",
    ] {
        let reply = get(&router, &format!("/{}", action)).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", action);
        let model = &reply.json()["model"];
        assert_eq!(model["MethodName"], action);
        assert!(model["ExecutionTime"].as_f64().unwrap() >= 0.0);
    }

    let reply = get(&router, "/TestFilter").await;
    assert_eq!(reply.json()["model"]["ExecutionTime"], 0.0);
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let router = router();
    let reply = get(&router, "/").await;
    let id = reply.header(mvc_dispatch::http::X_REQUEST_ID).unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "client-chosen")
        .body(Body::empty())
        .unwrap();
    let reply = send(&router, request).await;
    assert_eq!(reply.header(mvc_dispatch::http::X_REQUEST_ID), Some("client-chosen"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let config = parse_config("[listener]\nmax_body_bytes = 16").unwrap();
    let reply = post_form(&router_with(&config), "/TestModelBinding", &"Day=5&".repeat(20)).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_configured_route_with_set_constraint() {
    let config = parse_config(
        r#"
        [dispatch]
        policy = "namespace"
        namespace = "app::controllers"

        [[routes]]
        name = "members"
        pattern = "members/{user}"
        methods = ["GET"]
        defaults = { controller = "TestRouteConstraint", action = "Match" }
        constraints = [{ kind = "set", parameter = "user", values = ["alice", "Bob"] }]
        "#,
    )
    .unwrap();
    let router = router_with(&config);

    let reply = get(&router, "/members/BOB").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["viewData"]["User"], "BOB");

    assert_eq!(get(&router, "/members/carol").await.status, StatusCode::NOT_FOUND);
}
