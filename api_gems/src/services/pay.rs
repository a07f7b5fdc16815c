use std::collections::HashMap;

use common::error::{AppError, Res};
use sqlx::PgPool;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, Customer, CustomerId, Event, EventObject,
    EventType, SubscriptionStatus, Webhook,
};
use uuid::Uuid;

use crate::models::pack::GemPack;

/// Retrieve customer object based on customer ID.
pub async fn get_customer(client: &Client, customer_id: &str) -> Res<Customer> {
    let id = customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })?;
    Customer::retrieve(client, &id, &[])
        .await
        .map_err(AppError::from)
}

/// Creates a one-time-payment checkout session for a gem pack. The user
/// id and gem amount ride along as session metadata for reconciliation;
/// the authoritative credit happens against the `gem_purchases` row keyed
/// by the session id.
pub async fn create_gem_checkout_session(
    client: &Client,
    customer: &Customer,
    user_id: Uuid,
    pack: &GemPack,
    success_url: &str,
    cancel_url: &str,
) -> Res<CheckoutSession> {
    let metadata = HashMap::from([
        ("user_id".to_string(), user_id.to_string()),
        ("gems".to_string(), pack.gems.to_string()),
    ]);

    let params = stripe::CreateCheckoutSession {
        payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(pack.id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Payment),
        success_url: Some(success_url),
        cancel_url: Some(cancel_url),
        customer: Some(customer.id.clone()),
        metadata: Some(metadata),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}

/// Processes a verified webhook event.
///
/// Completed checkouts credit the purchased gems; subscription lifecycle
/// events update the premium flags. Everything else is logged and
/// acknowledged so Stripe stops redelivering.
pub async fn process_webhook_event(pool: &PgPool, event: Event) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                credit_completed_checkout(pool, session.id.as_str()).await?;
            }
        }
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                log::info!("PaymentIntent was successful: {}", payment_intent.id);
            }
        }
        EventType::CustomerSubscriptionCreated | EventType::CustomerSubscriptionUpdated => {
            if let EventObject::Subscription(subscription) = event.data.object {
                let customer_id = expandable_customer_id(&subscription.customer);
                let status = subscription.status.to_string();
                let is_premium = matches!(
                    subscription.status,
                    SubscriptionStatus::Active | SubscriptionStatus::Trialing
                );
                db::user::set_subscription_status(pool, &customer_id, Some(&status), is_premium)
                    .await?;
                log::info!(
                    "Subscription {} for customer {} is now {}",
                    subscription.id,
                    customer_id,
                    status
                );
            }
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                let customer_id = expandable_customer_id(&subscription.customer);
                db::user::set_subscription_status(pool, &customer_id, Some("canceled"), false)
                    .await?;
                log::info!("Subscription deleted for customer {}", customer_id);
            }
        }
        _ => {
            log::info!("Unhandled event type: {}", event.type_);
        }
    }

    Ok(())
}

/// Marks the purchase row completed and credits its gems, in one
/// transaction. A session that is unknown or already completed credits
/// nothing, which makes redelivered events harmless.
async fn credit_completed_checkout(pool: &PgPool, session_id: &str) -> Res<()> {
    let mut tx = pool.begin().await?;

    let purchase = db::purchase::complete_purchase(&mut *tx, session_id).await?;
    match purchase {
        Some(purchase) => {
            db::user::credit_tokens(&mut *tx, purchase.user_id, purchase.gems)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Purchase {} references missing user {}",
                        purchase.id, purchase.user_id
                    ))
                })?;
            tx.commit().await?;
            log::info!(
                "Credited {} gems to user {} for session {}",
                purchase.gems,
                purchase.user_id,
                session_id
            );
        }
        None => {
            tx.rollback().await?;
            log::info!(
                "Checkout session {} already processed or unknown; skipping credit",
                session_id
            );
        }
    }

    Ok(())
}

fn expandable_customer_id(customer: &stripe::Expandable<Customer>) -> String {
    match customer {
        stripe::Expandable::Id(id) => id.to_string(),
        stripe::Expandable::Object(customer) => customer.id.to_string(),
    }
}
