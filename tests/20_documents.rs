mod common;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn first_read_seeds_nine_primary_documents() -> Result<()> {
    let app = common::test_app();
    let user = Uuid::new_v4();
    let token = common::user_token(user);
    let loan_id = common::create_application(&app.router, &token, false, false).await?;

    let (status, body) = common::send(
        &app.router,
        common::json_request("GET", &format!("/api/documents/{}", loan_id), Some(&token), None),
    )
    .await?;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    let docs = body["documents"]["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 9);
    assert_eq!(body["documents"]["status"], "pending");
    assert_eq!(body["documents"]["loanInfoId"], loan_id.to_string());
    Ok(())
}

#[tokio::test]
async fn partner_and_business_documents_are_conditional() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());

    let with_partner = common::create_application(&app.router, &token, true, false).await?;
    let (_, body) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/{}", with_partner),
            Some(&token),
            None,
        ),
    )
    .await?;
    assert_eq!(body["documents"]["documents"].as_array().unwrap().len(), 12);

    let full = common::create_application(&app.router, &token, true, true).await?;
    let (_, body) = common::send(
        &app.router,
        common::json_request("GET", &format!("/api/documents/{}", full), Some(&token), None),
    )
    .await?;
    assert_eq!(body["documents"]["documents"].as_array().unwrap().len(), 15);
    Ok(())
}

#[tokio::test]
async fn unknown_application_is_not_found() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/{}", Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn foreign_application_is_hidden() -> Result<()> {
    let app = common::test_app();
    let owner_token = common::user_token(Uuid::new_v4());
    let loan_id = common::create_application(&app.router, &owner_token, false, false).await?;

    let other_token = common::user_token(Uuid::new_v4());
    let (status, _) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/{}", loan_id),
            Some(&other_token),
            None,
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn explicit_create_conflicts_with_existing_collection() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());
    let loan_id = common::create_application(&app.router, &token, false, false).await?;

    let (status, _) = common::send(
        &app.router,
        common::json_request(
            "POST",
            &format!("/api/documents/{}", loan_id),
            Some(&token),
            None,
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "POST",
            &format!("/api/documents/{}", loan_id),
            Some(&token),
            None,
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn put_replaces_the_documents_array() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());
    let loan_id = common::create_application(&app.router, &token, false, false).await?;

    let replacement = serde_json::json!({
        "documents": [{
            "id": "doc1",
            "name": "Identity document",
            "description": "Valid passport only",
            "category": "identity",
            "required": true,
            "multipleAllowed": false,
            "applicableFor": "primary",
            "uploadedFiles": []
        }]
    });

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "PUT",
            &format!("/api/documents/{}", loan_id),
            Some(&token),
            Some(replacement),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["documents"]["documents"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn list_returns_all_collections_for_the_user() -> Result<()> {
    let app = common::test_app();
    let user = Uuid::new_v4();
    let token = common::user_token(user);

    let a = common::create_application(&app.router, &token, false, false).await?;
    let b = common::create_application(&app.router, &token, false, false).await?;
    for loan_id in [a, b] {
        common::send(
            &app.router,
            common::json_request(
                "GET",
                &format!("/api/documents/{}", loan_id),
                Some(&token),
                None,
            ),
        )
        .await?;
    }

    let (status, body) = common::send(
        &app.router,
        common::json_request("GET", "/api/documents", Some(&token), None),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn offers_are_deterministic_and_sorted() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());
    let uri = "/api/offers?amount=250000&propertyValue=320000&termMonths=360";

    let (status, first) =
        common::send(&app.router, common::json_request("GET", uri, Some(&token), None)).await?;
    assert_eq!(status, StatusCode::OK, "{}", first);
    let (_, second) =
        common::send(&app.router, common::json_request("GET", uri, Some(&token), None)).await?;
    assert_eq!(first, second);

    let offers = first["offers"].as_array().unwrap();
    assert_eq!(offers.len(), 5);
    let payments: Vec<f64> = offers
        .iter()
        .map(|o| o["monthlyPayment"].as_f64().unwrap())
        .collect();
    assert!(payments.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[tokio::test]
async fn offers_require_positive_amount() -> Result<()> {
    let app = common::test_app();
    let token = common::user_token(Uuid::new_v4());

    let (status, _) = common::send(
        &app.router,
        common::json_request(
            "GET",
            "/api/offers?amount=0&propertyValue=320000&termMonths=360",
            Some(&token),
            None,
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
