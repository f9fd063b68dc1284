use chrono::{SecondsFormat, Utc};
use mongodb::bson::{doc, Document};
use serde_json::Value;
use validator::Validate;

use crate::database::{documents, Collection, DocumentStore, Sort};
use crate::models::{PaymentRecordedResponse, RecordPaymentRequest, PAYMENT_TYPE};
use crate::utils::error::AppResult;

/// Stores a payment record reported by the client.
///
/// The record is not checked against the processor; the client asserts
/// that the charge succeeded.
pub async fn record_payment(
    store: &dyn DocumentStore,
    request: RecordPaymentRequest,
) -> AppResult<PaymentRecordedResponse> {
    request.validate()?;

    let paid_at = request.paid_at.unwrap_or_else(Utc::now);

    let mut record = doc! {
        "scholarshipId": request.scholarship_id.as_str(),
        "userEmail": request.user_email.as_str(),
        "amount": request.amount,
        "transactionId": request.transaction_id.as_str(),
    };
    if let Some(method) = &request.payment_method {
        record.insert("paymentMethod", method.as_str());
    }
    record.insert("paidAt", documents::to_bson_datetime(paid_at));
    record.insert("paidAtString", paid_at.to_rfc3339_opts(SecondsFormat::Millis, true));
    record.insert("type", PAYMENT_TYPE);

    let id = store.insert_one(Collection::Payments, record).await?;
    log::info!(
        "✅ Payment recorded: {} {} by {} ({})",
        request.amount,
        request.transaction_id,
        request.user_email,
        id
    );

    Ok(PaymentRecordedResponse {
        message: "Payment recorded successfully".to_string(),
        inserted_id: id.to_hex(),
    })
}

/// Payment history, latest first, optionally for one payer.
pub async fn list_payments(store: &dyn DocumentStore, email: Option<&str>) -> AppResult<Vec<Value>> {
    let filter = match email {
        Some(email) => doc! { "userEmail": email },
        None => Document::new(),
    };

    let payments = store
        .find(Collection::Payments, filter, Some(Sort::newest_first("paidAt")))
        .await?;
    Ok(documents::to_json_list(payments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::utils::error::AppError;
    use serde_json::json;

    fn payment(email: &str, paid_at: Option<&str>) -> RecordPaymentRequest {
        let mut body = json!({
            "scholarshipId": "s1",
            "userEmail": email,
            "amount": 50.0,
            "transactionId": "pi_123",
            "paymentMethod": "card",
        });
        if let Some(paid_at) = paid_at {
            body["paidAt"] = json!(paid_at);
        }
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_record_normalizes_timestamp_and_type() {
        let store = MemoryStore::new();
        record_payment(&store, payment("a@b.com", Some("2024-05-01T12:00:00+02:00")))
            .await
            .unwrap();

        let listed = list_payments(&store, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["paidAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(listed[0]["paidAtString"], "2024-05-01T10:00:00.000Z");
        assert_eq!(listed[0]["type"], "scholarship");
        assert_eq!(listed[0]["paymentMethod"], "card");
    }

    #[tokio::test]
    async fn test_missing_paid_at_defaults_to_now() {
        let store = MemoryStore::new();
        let before = Utc::now().timestamp_millis();
        record_payment(&store, payment("a@b.com", None)).await.unwrap();

        let stored = store.find(Collection::Payments, doc! {}, None).await.unwrap();
        let paid_at = stored[0].get_datetime("paidAt").unwrap().timestamp_millis();
        assert!(paid_at >= before);
    }

    #[tokio::test]
    async fn test_list_filters_by_email_latest_first() {
        let store = MemoryStore::new();
        record_payment(&store, payment("a@b.com", Some("2024-01-01T00:00:00Z"))).await.unwrap();
        record_payment(&store, payment("c@d.com", Some("2024-02-01T00:00:00Z"))).await.unwrap();
        record_payment(&store, payment("a@b.com", Some("2024-03-01T00:00:00Z"))).await.unwrap();

        let mine = list_payments(&store, Some("a@b.com")).await.unwrap();
        let dates: Vec<&str> = mine.iter().map(|p| p["paidAtString"].as_str().unwrap()).collect();
        assert_eq!(dates, vec!["2024-03-01T00:00:00.000Z", "2024-01-01T00:00:00.000Z"]);
    }

    #[tokio::test]
    async fn test_zero_amount_is_rejected() {
        let store = MemoryStore::new();
        let mut request = payment("a@b.com", None);
        request.amount = 0.0;

        assert!(matches!(record_payment(&store, request).await, Err(AppError::Validation(_))));
    }
}
