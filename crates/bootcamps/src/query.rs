//! List query model: filters, projection, sort and pagination.
//!
//! Parsed from raw query-string pairs such as
//! `averageCost[lte]=10000&careers[in]=Business,UI/UX&select=name&sort=-averageCost&page=2`.
//! The same model drives the in-memory evaluation here and the SQL builder in
//! the infrastructure layer, so both stores answer a query identically.

use core::cmp::Ordering;

use serde::Serialize;

use devcamp_core::{DomainError, DomainResult, UserId};

use crate::{Bootcamp, Career};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

/// Top-level response fields a caller may `select`. `id` is always returned.
pub const SELECTABLE_FIELDS: &[&str] = &[
    "name",
    "slug",
    "description",
    "website",
    "phone",
    "email",
    "location",
    "careers",
    "averageRating",
    "averageCost",
    "photo",
    "housing",
    "jobAssistance",
    "jobGuarantee",
    "acceptGi",
    "user",
    "createdAt",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            Comparison::Eq => ord == Ordering::Equal,
            Comparison::Gt => ord == Ordering::Greater,
            Comparison::Gte => ord != Ordering::Less,
            Comparison::Lt => ord == Ordering::Less,
            Comparison::Lte => ord != Ordering::Greater,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumericField {
    AverageCost,
    AverageRating,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlagField {
    Housing,
    JobAssistance,
    JobGuarantee,
    AcceptGi,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextField {
    Name,
    City,
    State,
    Zipcode,
}

/// One filter condition. All conditions of a query must hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Number { field: NumericField, op: Comparison, value: f64 },
    NumberIn { field: NumericField, values: Vec<f64> },
    Flag { field: FlagField, value: bool },
    /// Equality with any of `values`.
    Text { field: TextField, values: Vec<String> },
    /// Bootcamp offers at least one of these careers.
    Careers(Vec<Career>),
    Owner(UserId),
}

impl Filter {
    pub fn matches(&self, b: &Bootcamp) -> bool {
        match self {
            Filter::Number { field, op, value } => numeric(b, *field)
                .is_some_and(|v| op.holds(v.total_cmp(value))),
            Filter::NumberIn { field, values } => {
                numeric(b, *field).is_some_and(|v| values.contains(&v))
            }
            Filter::Flag { field, value } => flag(b, *field) == *value,
            Filter::Text { field, values } => {
                text(b, *field).is_some_and(|v| values.iter().any(|x| x == v))
            }
            Filter::Careers(careers) => b.careers.iter().any(|c| careers.contains(c)),
            Filter::Owner(user) => b.user == *user,
        }
    }
}

fn numeric(b: &Bootcamp, field: NumericField) -> Option<f64> {
    match field {
        NumericField::AverageCost => b.average_cost,
        NumericField::AverageRating => b.average_rating,
    }
}

fn flag(b: &Bootcamp, field: FlagField) -> bool {
    match field {
        FlagField::Housing => b.housing,
        FlagField::JobAssistance => b.job_assistance,
        FlagField::JobGuarantee => b.job_guarantee,
        FlagField::AcceptGi => b.accept_gi,
    }
}

fn text(b: &Bootcamp, field: TextField) -> Option<&str> {
    let location = b.location.as_ref();
    match field {
        TextField::Name => Some(b.name.as_str()),
        TextField::City => location.and_then(|l| l.city.as_deref()),
        TextField::State => location.and_then(|l| l.state.as_deref()),
        TextField::Zipcode => location.and_then(|l| l.zipcode.as_deref()),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortField {
    Name,
    AverageCost,
    AverageRating,
    CreatedAt,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Parsed list query.
#[derive(Debug, Clone, PartialEq)]
pub struct BootcampQuery {
    pub filters: Vec<Filter>,
    pub sort: Vec<SortKey>,
    pub select: Option<Vec<String>>,
    pub page: u32,
    pub limit: u32,
}

impl Default for BootcampQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: vec![SortKey {
                field: SortField::CreatedAt,
                descending: true,
            }],
            select: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl BootcampQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "select" => query.select = Some(parse_select(value)?),
                "sort" => query.sort = parse_sort(value)?,
                "page" => {
                    query.page = parse_u32("page", value)?;
                    if query.page == 0 {
                        return Err(DomainError::validation("page must be at least 1"));
                    }
                }
                "limit" => query.limit = parse_u32("limit", value)?.clamp(1, MAX_LIMIT),
                _ => query.filters.push(parse_filter(key, value)?),
            }
        }
        Ok(query)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn matches(&self, b: &Bootcamp) -> bool {
        self.filters.iter().all(|f| f.matches(b))
    }

    /// Ordering by the sort keys, then by id so pages are stable.
    pub fn compare(&self, a: &Bootcamp, b: &Bootcamp) -> Ordering {
        for key in &self.sort {
            let ord = match key.field {
                SortField::Name => a.name.cmp(&b.name),
                SortField::AverageCost => cmp_opt(a.average_cost, b.average_cost),
                SortField::AverageRating => cmp_opt(a.average_rating, b.average_rating),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.as_uuid().cmp(b.id.as_uuid())
    }

    /// Evaluate the query over an in-memory collection.
    pub fn apply<'a>(&self, items: impl IntoIterator<Item = &'a Bootcamp>) -> Page<Bootcamp> {
        let mut matched: Vec<&Bootcamp> = items.into_iter().filter(|b| self.matches(b)).collect();
        matched.sort_by(|a, b| self.compare(a, b));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .cloned()
            .collect();
        Page { items, total }
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        let start = self.offset();
        let end = u64::from(self.page) * u64::from(self.limit);
        Pagination {
            next: self
                .page
                .checked_add(1)
                .filter(|_| end < total)
                .map(|page| PageRef { page, limit: self.limit }),
            prev: (start > 0).then(|| PageRef {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }

    /// Keep only `id` and the selected fields of a serialized bootcamp.
    pub fn project(&self, value: serde_json::Value) -> serde_json::Value {
        let Some(fields) = &self.select else {
            return value;
        };
        match value {
            serde_json::Value::Object(mut map) => {
                map.retain(|k, _| k == "id" || fields.iter().any(|f| f == k));
                serde_json::Value::Object(map)
            }
            other => other,
        }
    }
}

fn cmp_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn parse_u32(name: &str, value: &str) -> DomainResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("{name} must be a positive integer")))
}

fn parse_select(value: &str) -> DomainResult<Vec<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| {
            if f == "id" || SELECTABLE_FIELDS.contains(&f) {
                Ok(f.to_string())
            } else {
                Err(DomainError::validation(format!("cannot select unknown field `{f}`")))
            }
        })
        .collect()
}

fn parse_sort(value: &str) -> DomainResult<Vec<SortKey>> {
    let keys = value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            let (descending, name) = match k.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, k),
            };
            let field = match name {
                "name" => SortField::Name,
                "averageCost" => SortField::AverageCost,
                "averageRating" => SortField::AverageRating,
                "createdAt" => SortField::CreatedAt,
                other => {
                    return Err(DomainError::validation(format!("cannot sort by `{other}`")));
                }
            };
            Ok(SortKey { field, descending })
        })
        .collect::<DomainResult<Vec<_>>>()?;

    if keys.is_empty() {
        return Ok(BootcampQuery::default().sort);
    }
    Ok(keys)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Operator {
    Cmp(Comparison),
    In,
}

/// `field` or `field[op]`.
fn split_key(key: &str) -> DomainResult<(&str, Operator)> {
    let Some((field, rest)) = key.split_once('[') else {
        return Ok((key, Operator::Cmp(Comparison::Eq)));
    };
    let op = rest
        .strip_suffix(']')
        .ok_or_else(|| DomainError::validation(format!("malformed filter `{key}`")))?;
    let op = match op {
        "gt" => Operator::Cmp(Comparison::Gt),
        "gte" => Operator::Cmp(Comparison::Gte),
        "lt" => Operator::Cmp(Comparison::Lt),
        "lte" => Operator::Cmp(Comparison::Lte),
        "in" => Operator::In,
        other => {
            return Err(DomainError::validation(format!("unsupported filter operator `{other}`")));
        }
    };
    Ok((field, op))
}

fn list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(field: &str, value: &str) -> DomainResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::validation(format!("`{field}` expects a number")))
}

fn parse_filter(key: &str, value: &str) -> DomainResult<Filter> {
    let (field, op) = split_key(key)?;
    let unsupported = || DomainError::validation(format!("operator not supported for `{field}`"));

    let numeric_field = match field {
        "averageCost" => Some(NumericField::AverageCost),
        "averageRating" => Some(NumericField::AverageRating),
        _ => None,
    };
    if let Some(numeric_field) = numeric_field {
        return match op {
            Operator::Cmp(op) => Ok(Filter::Number {
                field: numeric_field,
                op,
                value: parse_number(field, value)?,
            }),
            Operator::In => Ok(Filter::NumberIn {
                field: numeric_field,
                values: list(value).map(|v| parse_number(field, v)).collect::<DomainResult<_>>()?,
            }),
        };
    }

    let flag_field = match field {
        "housing" => Some(FlagField::Housing),
        "jobAssistance" => Some(FlagField::JobAssistance),
        "jobGuarantee" => Some(FlagField::JobGuarantee),
        "acceptGi" => Some(FlagField::AcceptGi),
        _ => None,
    };
    if let Some(flag_field) = flag_field {
        if op != Operator::Cmp(Comparison::Eq) {
            return Err(unsupported());
        }
        let value = match value.trim() {
            "true" => true,
            "false" => false,
            _ => return Err(DomainError::validation(format!("`{field}` expects true or false"))),
        };
        return Ok(Filter::Flag { field: flag_field, value });
    }

    let text_field = match field {
        "name" => Some(TextField::Name),
        "location.city" => Some(TextField::City),
        "location.state" => Some(TextField::State),
        "location.zipcode" => Some(TextField::Zipcode),
        _ => None,
    };
    if let Some(text_field) = text_field {
        let values = match op {
            Operator::Cmp(Comparison::Eq) => vec![value.to_string()],
            Operator::In => list(value).map(str::to_string).collect(),
            Operator::Cmp(_) => return Err(unsupported()),
        };
        return Ok(Filter::Text { field: text_field, values });
    }

    match (field, op) {
        ("careers", Operator::Cmp(Comparison::Eq)) => Ok(Filter::Careers(vec![value.parse()?])),
        ("careers", Operator::In) => Ok(Filter::Careers(
            list(value).map(str::parse).collect::<DomainResult<_>>()?,
        )),
        ("user", Operator::Cmp(Comparison::Eq)) => value
            .trim()
            .parse()
            .map(Filter::Owner)
            .map_err(|_| DomainError::validation(format!("`{value}` is not a user id"))),
        ("careers" | "user", _) => Err(unsupported()),
        _ => Err(DomainError::validation(format!("cannot filter by `{field}`"))),
    }
}
