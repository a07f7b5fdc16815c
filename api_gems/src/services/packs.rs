use common::error::{AppError, Res};
use stripe::{Client, ListPrices, Price, PriceType};

use crate::models::pack::GemPack;

/// Fetches the gem packs on offer from Stripe. A pack is any active
/// one-time price whose product carries a `gem_amount` metadata entry.
/// Called once at startup; the result is shared as app data.
pub async fn get_gem_packs(client: &Client) -> Res<Vec<GemPack>> {
    let params = ListPrices {
        active: Some(true),
        limit: Some(100),
        expand: &["data.product"],
        ..Default::default()
    };

    let prices = Price::list(client, &params).await.map_err(AppError::from)?;

    let packs = prices
        .data
        .into_iter()
        .filter_map(|price| {
            // Subscriptions plans are not gem packs
            if price.type_ != Some(PriceType::OneTime) {
                return None;
            }

            let product_obj = price.product.as_ref().and_then(|p| p.as_object())?;
            let gems = product_obj
                .metadata
                .as_ref()
                .and_then(|map| map.get("gem_amount"))
                .and_then(|raw| raw.parse::<i64>().ok())?;

            if gems <= 0 {
                log::warn!("Ignoring pack {} with non-positive gem_amount", price.id);
                return None;
            }

            Some(GemPack {
                id: price.id.to_string(),
                name: product_obj.name.clone().unwrap_or_default(),
                description: product_obj.description.clone().unwrap_or_default(),
                gems,
                price: price.unit_amount.unwrap_or(0),
                currency: price
                    .currency
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "usd".to_string()),
            })
        })
        .collect();

    Ok(packs)
}
