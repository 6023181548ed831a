//! Bootcamp record and its create/update inputs.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devcamp_core::validate::{is_email, is_http_url};
use devcamp_core::{BootcampId, DomainError, DomainResult, Entity, GeoPoint, UserId};

use crate::photo::DEFAULT_PHOTO;

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_PHONE_LEN: usize = 20;

// ─────────────────────────────────────────────────────────────────────────────
// Career
// ─────────────────────────────────────────────────────────────────────────────

/// Career track a bootcamp trains for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Business")]
    Business,
    #[serde(rename = "Other")]
    Other,
}

impl Career {
    pub const ALL: [Career; 6] = [
        Career::WebDevelopment,
        Career::MobileDevelopment,
        Career::UiUx,
        Career::DataScience,
        Career::Business,
        Career::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Career::WebDevelopment => "Web Development",
            Career::MobileDevelopment => "Mobile Development",
            Career::UiUx => "UI/UX",
            Career::DataScience => "Data Science",
            Career::Business => "Business",
            Career::Other => "Other",
        }
    }
}

impl core::fmt::Display for Career {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Career {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Career::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("`{s}` is not a valid career")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────────────────

/// GeoJSON-style point plus the address parts returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn at(point: GeoPoint, formatted_address: impl Into<String>) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [point.longitude, point.latitude],
            formatted_address: formatted_address.into(),
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            longitude: self.coordinates[0],
            latitude: self.coordinates[1],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bootcamp
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: BootcampId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<Location>,
    pub careers: Vec<Career>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub photo: String,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
    pub user: UserId,
    pub created_at: DateTime<Utc>,
}

impl Entity for Bootcamp {
    type Id = BootcampId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Bootcamp {
    /// Build a new record owned by `owner`. `location` is the geocoded address.
    pub fn create(
        cmd: CreateBootcamp,
        owner: UserId,
        location: Option<Location>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BootcampId::new(),
            slug: slugify(&cmd.name),
            name: cmd.name,
            description: cmd.description,
            website: cmd.website,
            phone: cmd.phone,
            email: cmd.email,
            location,
            careers: cmd.careers,
            average_rating: cmd.average_rating,
            average_cost: cmd.average_cost,
            photo: DEFAULT_PHOTO.to_string(),
            housing: cmd.housing,
            job_assistance: cmd.job_assistance,
            job_guarantee: cmd.job_guarantee,
            accept_gi: cmd.accept_gi,
            user: owner,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.user == user
    }

    /// Apply a partial update. A new `location` replaces the old one only when
    /// the update carried an address.
    pub fn apply_update(&mut self, upd: UpdateBootcamp, location: Option<Location>) {
        if let Some(name) = upd.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if let Some(description) = upd.description {
            self.description = description;
        }
        if let Some(website) = upd.website {
            self.website = Some(website);
        }
        if let Some(phone) = upd.phone {
            self.phone = Some(phone);
        }
        if let Some(email) = upd.email {
            self.email = Some(email);
        }
        if upd.address.is_some() {
            self.location = location;
        }
        if let Some(careers) = upd.careers {
            self.careers = careers;
        }
        if let Some(rating) = upd.average_rating {
            self.average_rating = Some(rating);
        }
        if let Some(cost) = upd.average_cost {
            self.average_cost = Some(cost);
        }
        if let Some(v) = upd.housing {
            self.housing = v;
        }
        if let Some(v) = upd.job_assistance {
            self.job_assistance = v;
        }
        if let Some(v) = upd.job_guarantee {
            self.job_guarantee = v;
        }
        if let Some(v) = upd.accept_gi {
            self.accept_gi = v;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Raw, unvalidated request fields shared by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

/// Validated create input.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBootcamp {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<Career>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

impl CreateBootcamp {
    pub fn new(fields: BootcampFields) -> DomainResult<Self> {
        let name = fields.name.ok_or_else(|| DomainError::validation("Please add a name"))?;
        let description = fields
            .description
            .ok_or_else(|| DomainError::validation("Please add a description"))?;
        let address = fields
            .address
            .ok_or_else(|| DomainError::validation("Please add an address"))?;
        let careers = fields
            .careers
            .ok_or_else(|| DomainError::validation("Please add at least one career"))?;

        Ok(Self {
            name: validate_name(name)?,
            description: validate_description(description)?,
            website: fields.website.map(validate_website).transpose()?,
            phone: fields.phone.map(validate_phone).transpose()?,
            email: fields.email.map(validate_email).transpose()?,
            address: validate_address(address)?,
            careers: parse_careers(careers)?,
            average_rating: fields.average_rating.map(validate_rating).transpose()?,
            average_cost: fields.average_cost.map(validate_cost).transpose()?,
            housing: fields.housing.unwrap_or(false),
            job_assistance: fields.job_assistance.unwrap_or(false),
            job_guarantee: fields.job_guarantee.unwrap_or(false),
            accept_gi: fields.accept_gi.unwrap_or(false),
        })
    }
}

/// Validated partial update (absent fields stay unchanged).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBootcamp {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<Career>>,
    pub average_rating: Option<f64>,
    pub average_cost: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl UpdateBootcamp {
    pub fn new(fields: BootcampFields) -> DomainResult<Self> {
        Ok(Self {
            name: fields.name.map(validate_name).transpose()?,
            description: fields.description.map(validate_description).transpose()?,
            website: fields.website.map(validate_website).transpose()?,
            phone: fields.phone.map(validate_phone).transpose()?,
            email: fields.email.map(validate_email).transpose()?,
            address: fields.address.map(validate_address).transpose()?,
            careers: fields.careers.map(parse_careers).transpose()?,
            average_rating: fields.average_rating.map(validate_rating).transpose()?,
            average_cost: fields.average_cost.map(validate_cost).transpose()?,
            housing: fields.housing,
            job_assistance: fields.job_assistance,
            job_guarantee: fields.job_guarantee,
            accept_gi: fields.accept_gi,
        })
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("Please add a name"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "Name can not be more than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn validate_description(description: String) -> DomainResult<String> {
    if description.trim().is_empty() {
        return Err(DomainError::validation("Please add a description"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "Description can not be more than {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description)
}

fn validate_website(website: String) -> DomainResult<String> {
    if !is_http_url(&website) {
        return Err(DomainError::validation("Please use a valid URL with HTTP or HTTPS"));
    }
    Ok(website)
}

fn validate_phone(phone: String) -> DomainResult<String> {
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(DomainError::validation(format!(
            "Phone number can not be longer than {MAX_PHONE_LEN} characters"
        )));
    }
    Ok(phone)
}

fn validate_email(email: String) -> DomainResult<String> {
    if !is_email(&email) {
        return Err(DomainError::validation("Please add a valid email"));
    }
    Ok(email)
}

fn validate_address(address: String) -> DomainResult<String> {
    let address = address.trim().to_string();
    if address.is_empty() {
        return Err(DomainError::validation("Please add an address"));
    }
    Ok(address)
}

fn parse_careers(raw: Vec<String>) -> DomainResult<Vec<Career>> {
    if raw.is_empty() {
        return Err(DomainError::validation("Please add at least one career"));
    }
    let mut careers = Vec::with_capacity(raw.len());
    for name in raw {
        let career: Career = name.parse()?;
        if !careers.contains(&career) {
            careers.push(career);
        }
    }
    Ok(careers)
}

fn validate_rating(rating: f64) -> DomainResult<f64> {
    if !(1.0..=10.0).contains(&rating) {
        return Err(DomainError::validation("Rating must be between 1 and 10"));
    }
    Ok(rating)
}

fn validate_cost(cost: f64) -> DomainResult<f64> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(DomainError::validation("Average cost can not be negative"));
    }
    Ok(cost)
}

/// URL-friendly form of a name: lowercase ASCII alphanumerics joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
