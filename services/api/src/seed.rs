//! Demo data so a fresh deployment never shows an empty calendar

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use crate::{
    gateway::Gateway,
    models::payloads::{
        CreateBookingRequest, CreatePropertyRequest, CreateRoomRequest, SignupRequest,
    },
};

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

/// Pre-fill the store with a demo landlord, property, rooms and booking.
/// Does nothing if the demo user already exists.
pub async fn seed_demo_data(gateway: &Gateway) -> Result<()> {
    if gateway
        .store()
        .find_user_by_username(DEMO_USERNAME)
        .await?
        .is_some()
    {
        info!("Demo data already present, skipping seed");
        return Ok(());
    }

    let user = gateway
        .signup(&SignupRequest {
            username: DEMO_USERNAME.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })
        .await?;

    let property = gateway
        .create_property(&CreatePropertyRequest {
            name: "Blue Water Duplex".to_string(),
            location: "Lekki Phase 1".to_string(),
            pin: None,
            user_id: user.id,
        })
        .await?;

    let whole = gateway
        .create_room(&CreateRoomRequest {
            property_id: property.id,
            name: "Whole Apartment".to_string(),
            price: "₦200,000".to_string(),
        })
        .await?;

    gateway
        .create_room(&CreateRoomRequest {
            property_id: property.id,
            name: "Master Bedroom".to_string(),
            price: "₦65,000".to_string(),
        })
        .await?;

    let today = Utc::now().date_naive();
    gateway
        .create_booking(&CreateBookingRequest {
            room_id: whole.id,
            start: today,
            end: today + Duration::days(3),
            label: Some("Demo Booking".to_string()),
            pin: property.pin.clone(),
            source: None,
        })
        .await?;

    info!("Seeded demo data for user {}", user.username);
    Ok(())
}
