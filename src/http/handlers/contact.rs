use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::{
    errors::AppError,
    forms::{ContactReply, ContactRequest, PLANS, Plan, find_plan},
    state::AppState,
};

pub async fn submit_contact_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let contact = payload.validate()?;
    let restaurant_name = contact.restaurant_name.clone();

    state
        .store
        .insert_contact_submission(contact)
        .await
        .map_err(|e| {
            tracing::error!("Error submitting form: {}", e);
            e
        })?;

    tracing::info!("Contact submission received from {}", restaurant_name);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Thank you! We'll get back to you within 24 hours." })),
    ))
}

/// Emails the auto-reply for a contact submission.
pub async fn contact_reply_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContactReply>,
) -> Result<Json<Value>, AppError> {
    let mail = payload.validate()?;
    let mailer = state.mailer.as_ref().ok_or(AppError::MailerUnavailable)?;
    let recipient = mail.to.clone();

    mailer.send(mail).await.map_err(|e| {
        tracing::error!("Error sending contact reply to {}: {}", recipient, e);
        e
    })?;

    tracing::info!("Contact reply sent to {}", recipient);
    Ok(Json(json!({ "message": "Email sent successfully" })))
}

pub async fn list_plans_handler() -> Json<&'static [Plan]> {
    Json(PLANS.as_slice())
}

/// Contact form prefilled with the activation request for a paid plan.
pub async fn plan_contact_handler(Path(plan): Path<String>) -> Result<Json<ContactRequest>, AppError> {
    let plan = find_plan(&plan)?;

    match &plan.activation_message {
        Some(message) => Ok(Json(ContactRequest::prefilled(message.clone()))),
        None => Err(AppError::BadRequest(format!(
            "The {} plan is active by default",
            plan.name
        ))),
    }
}
