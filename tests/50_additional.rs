mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

const PDF: &[u8] = b"%PDF-1.4 test";

fn create_body(loan_id: Uuid) -> serde_json::Value {
    json!({
        "loanInfoId": loan_id,
        "name": "Pension statement",
        "description": "Most recent pension fund statement",
        "deadline": (Utc::now() + Duration::days(14)).to_rfc3339(),
        "requestedBy": "Reviewer@Example.com",
    })
}

async fn create_additional(
    app: &common::TestApp,
    admin: &str,
    loan_id: Uuid,
) -> Result<String> {
    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "POST",
            "/api/documents/additional",
            Some(admin),
            Some(create_body(loan_id)),
        ),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "create additional: {} {}", status, body);
    Ok(body["additionalDocument"]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn create_requires_admin_role() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;

    let (status, _) = common::send(
        &app.router,
        common::json_request(
            "POST",
            "/api/documents/additional",
            Some(&user_token),
            Some(create_body(loan_id)),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn create_requires_deadline() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;

    let mut body = create_body(loan_id);
    body.as_object_mut().unwrap().remove("deadline");

    let (status, response) = common::send(
        &app.router,
        common::json_request("POST", "/api/documents/additional", Some(&admin), Some(body)),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    Ok(())
}

#[tokio::test]
async fn create_seeds_placeholder_and_lowercases_requester() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "POST",
            "/api/documents/additional",
            Some(&admin),
            Some(create_body(loan_id)),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let request = &body["additionalDocument"];
    assert_eq!(request["status"], "requested");
    assert_eq!(request["requestedBy"], "reviewer@example.com");
    let files = request["uploadedFiles"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["status"], "requested");
    Ok(())
}

#[tokio::test]
async fn list_is_visible_to_the_applicant() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;
    create_additional(&app, &admin, loan_id).await?;

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/additional?loanInfoId={}", loan_id),
            Some(&user_token),
            None,
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["additionalDocuments"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn upload_against_missing_request_is_not_found() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;

    // Materialize the collection without any additional requests.
    common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/{}", loan_id),
            Some(&user_token),
            None,
        ),
    )
    .await?;

    let (status, _) = common::send(
        &app.router,
        common::multipart_request(
            "/api/documents/additional/upload",
            &user_token,
            &[
                ("loanInfoId", &loan_id.to_string()),
                ("additionalDocumentId", &Uuid::new_v4().to_string()),
            ],
            Some(("pension.pdf", PDF)),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.storage.object_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn upload_marks_request_uploaded() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;
    let additional_id = create_additional(&app, &admin, loan_id).await?;

    let (status, body) = common::send(
        &app.router,
        common::multipart_request(
            "/api/documents/additional/upload",
            &user_token,
            &[
                ("loanInfoId", &loan_id.to_string()),
                ("additionalDocumentId", &additional_id),
            ],
            Some(("pension.pdf", PDF)),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/additional?loanInfoId={}", loan_id),
            Some(&user_token),
            None,
        ),
    )
    .await?;
    let request = &body["additionalDocuments"][0];
    assert_eq!(request["status"], "uploaded");
    let files = request["uploadedFiles"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "pension.pdf");
    assert_eq!(files[0]["status"], "uploaded");
    Ok(())
}

#[tokio::test]
async fn verify_toggles_and_unverify_reverts_to_pending() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;
    let additional_id = create_additional(&app, &admin, loan_id).await?;

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "PUT",
            "/api/admin/documents/additional/verify",
            Some(&admin),
            Some(json!({ "loanInfoId": loan_id, "additionalDocumentId": additional_id })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["additionalDocument"]["status"], "verified");

    let (_, body) = common::send(
        &app.router,
        common::json_request(
            "PUT",
            "/api/admin/documents/additional/verify",
            Some(&admin),
            Some(json!({
                "loanInfoId": loan_id,
                "additionalDocumentId": additional_id,
                "verified": false
            })),
        ),
    )
    .await?;
    assert_eq!(body["additionalDocument"]["status"], "pending");
    Ok(())
}

#[tokio::test]
async fn admin_can_update_additional_file_status() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;
    let additional_id = create_additional(&app, &admin, loan_id).await?;

    let (_, body) = common::send(
        &app.router,
        common::multipart_request(
            "/api/documents/additional/upload",
            &user_token,
            &[
                ("loanInfoId", &loan_id.to_string()),
                ("additionalDocumentId", &additional_id),
            ],
            Some(("pension.pdf", PDF)),
        ),
    )
    .await?;
    let file_id = body["file"]["id"].as_str().unwrap().to_string();

    let (status, body) = common::send(
        &app.router,
        common::json_request(
            "PATCH",
            &format!("/api/admin/applications/{}/additional/{}", loan_id, file_id),
            Some(&admin),
            Some(json!({ "status": "verified" })),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);

    // The additional scope never rolls the collection up.
    assert_eq!(body["documents"]["status"], "pending");
    let request = &body["documents"]["additionalDocuments"][0];
    assert_eq!(request["uploadedFiles"][0]["status"], "verified");
    Ok(())
}

#[tokio::test]
async fn create_upserts_collection_when_absent() -> Result<()> {
    let app = common::test_app();
    let user_token = common::user_token(Uuid::new_v4());
    let admin = common::admin_token();
    // No document fetch first: the admin request must create the collection.
    let loan_id = common::create_application(&app.router, &user_token, false, false).await?;

    create_additional(&app, &admin, loan_id).await?;

    let (_, body) = common::send(
        &app.router,
        common::json_request(
            "GET",
            &format!("/api/documents/{}", loan_id),
            Some(&user_token),
            None,
        ),
    )
    .await?;
    assert_eq!(body["documents"]["documents"].as_array().unwrap().len(), 9);
    assert_eq!(
        body["documents"]["additionalDocuments"].as_array().unwrap().len(),
        1
    );
    Ok(())
}
