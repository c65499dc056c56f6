//! Demo data: a handful of bookable spaces and a bootstrap admin
//! account for a fresh installation.

use anyhow::{bail, Result};
use uuid::Uuid;

use crate::booking::time::now_local;
use crate::crypto::{generate_api_key, hash_api_key, hash_password};
use crate::db::Database;
use crate::models::{OperatingHours, Role, Space, SpaceCategory, User};

pub struct SeedReport {
    pub spaces: usize,
    pub admin_email: String,
    pub admin_api_key: String,
}

/// Load demo spaces and create the admin account. Refuses to run twice
/// against the same database.
pub fn seed(db: &Database, admin_email: &str, admin_password: &str) -> Result<SeedReport> {
    if db.get_user_by_email(admin_email)?.is_some() {
        bail!("admin account already exists: {}", admin_email);
    }

    let spaces = demo_spaces();
    for space in &spaces {
        db.create_space(space)?;
    }

    let api_key = generate_api_key();
    let admin = User {
        id: Uuid::new_v4().to_string(),
        email: admin_email.to_string(),
        identification_number: "0000".to_string(),
        full_name: "Administrator".to_string(),
        phone: "+1 555 0100".to_string(),
        role: Role::Admin,
        password_hash: hash_password(admin_password)?,
        api_key_hash: hash_api_key(&api_key)?,
        is_active: true,
        created_at: now_local().format("%Y-%m-%dT%H:%M:%S").to_string(),
    };
    db.create_user(&admin)?;

    Ok(SeedReport {
        spaces: spaces.len(),
        admin_email: admin.email,
        admin_api_key: api_key,
    })
}

fn demo_spaces() -> Vec<Space> {
    vec![
        Space {
            id: Uuid::new_v4().to_string(),
            name: "Main Football Field".to_string(),
            category: SpaceCategory::Sport,
            capacity: 22,
            description: "Synthetic turf field with night lighting, suitable for full matches."
                .to_string(),
            operating_hours: OperatingHours {
                start: "07:00".to_string(),
                end: "22:00".to_string(),
            },
            rules: vec![
                "Wear appropriate sports footwear".to_string(),
                "Leave the space clean after use".to_string(),
                "No smoking on the premises".to_string(),
            ],
            is_active: true,
            image_url: None,
        },
        Space {
            id: Uuid::new_v4().to_string(),
            name: "Aurora Event Hall".to_string(),
            category: SpaceCategory::Social,
            capacity: 100,
            description: "Large hall for celebrations, family gatherings and social events."
                .to_string(),
            operating_hours: OperatingHours {
                start: "10:00".to_string(),
                end: "23:00".to_string(),
            },
            rules: vec![
                "Maximum capacity 100 people".to_string(),
                "Decorations require prior authorization".to_string(),
                "No music after 22:00".to_string(),
            ],
            is_active: true,
            image_url: None,
        },
        Space {
            id: Uuid::new_v4().to_string(),
            name: "The Pines BBQ Area".to_string(),
            category: SpaceCategory::Barbecue,
            capacity: 30,
            description: "Outdoor area with grills, tables and a green zone for family cookouts."
                .to_string(),
            operating_hours: OperatingHours {
                start: "08:00".to_string(),
                end: "20:00".to_string(),
            },
            rules: vec![
                "Bring your own charcoal and utensils".to_string(),
                "Clean the grills after use".to_string(),
                "Never leave embers burning".to_string(),
            ],
            is_active: true,
            image_url: None,
        },
        Space {
            id: Uuid::new_v4().to_string(),
            name: "Central Auditorium".to_string(),
            category: SpaceCategory::Auditorium,
            capacity: 150,
            description: "Modern auditorium with professional sound and projection equipment."
                .to_string(),
            operating_hours: OperatingHours {
                start: "09:00".to_string(),
                end: "21:00".to_string(),
            },
            rules: vec![
                "Request training before using the equipment".to_string(),
                "No food inside".to_string(),
            ],
            is_active: true,
            image_url: None,
        },
    ]
}
