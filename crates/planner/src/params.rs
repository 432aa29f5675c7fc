//! The request parameter bag, with defaults applied.

use crate::{error::PlanError, filter::spec::FilterSpec};
use model::{
    core::{params::ParamValue, value::Value},
    pagination::page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, PageRequest},
};
use std::collections::BTreeMap;

pub const DEFAULT_LIMIT: i64 = 20;
pub const DEFAULT_OFFSET: i64 = 0;
/// `limit` value that disables the row limit.
pub const UNLIMITED: i64 = -1;

pub const LIMIT: &str = "limit";
pub const OFFSET: &str = "offset";
pub const ORDER_BY: &str = "orderBy";
pub const GROUP_BY: &str = "groupBy";
pub const WHERE: &str = "where";
pub const PARAMS: &str = "params";
pub const ALIAS: &str = "alias";
pub const SELECT: &str = "select";
pub const DISTINCT: &str = "distinct";
pub const JOIN: &str = "join";
pub const PAGE: &str = "page";
pub const PAGE_SIZE: &str = "pageSize";

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBag {
    pub limit: i64,
    pub offset: i64,
    pub order_by: ParamValue,
    pub group_by: ParamValue,
    pub filter: Option<FilterSpec>,
    pub params: BTreeMap<String, Value>,
    pub alias: Option<String>,
    pub select: ParamValue,
    pub distinct: bool,
    pub join: ParamValue,
    pub page: i64,
    pub page_size: i64,
}

impl Default for ParamBag {
    fn default() -> Self {
        ParamBag {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            order_by: ParamValue::null(),
            group_by: ParamValue::null(),
            filter: None,
            params: BTreeMap::new(),
            alias: None,
            select: ParamValue::null(),
            distinct: false,
            join: ParamValue::null(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ParamBag {
    /// Extracts the known keys from a request mapping. Unknown keys are
    /// ignored; missing ones take their defaults.
    pub fn from_request(request: &ParamValue) -> Result<Self, PlanError> {
        match request {
            ParamValue::Mapping(_) => {}
            ParamValue::Scalar(Value::Null) => return Ok(ParamBag::default()),
            _ => {
                return Err(PlanError::invalid_param(
                    "request",
                    "expected a mapping of query parameters",
                ));
            }
        }

        let defaults = ParamBag::default();
        let take = |key: &str| request.get(key).cloned().unwrap_or_else(ParamValue::null);

        Ok(ParamBag {
            limit: int_param(request, LIMIT, defaults.limit)?,
            offset: int_param(request, OFFSET, defaults.offset)?,
            order_by: take(ORDER_BY),
            group_by: take(GROUP_BY),
            filter: request
                .get(WHERE)
                .filter(|w| !w.is_blank())
                .map(FilterSpec::from),
            params: bindings(request.get(PARAMS))?,
            alias: string_param(request, ALIAS)?,
            select: take(SELECT),
            distinct: match request.get(DISTINCT) {
                None => false,
                Some(value) => value
                    .as_scalar()
                    .and_then(Value::as_bool)
                    .ok_or_else(|| PlanError::invalid_param(DISTINCT, "expected a boolean"))?,
            },
            join: take(JOIN),
            page: int_param(request, PAGE, defaults.page)?,
            page_size: int_param(request, PAGE_SIZE, defaults.page_size)?,
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Result<Self, PlanError> {
        ParamBag::from_request(&ParamValue::from(json))
    }

    /// Replaces the filter. Accepts anything convertible to a
    /// [`FilterSpec`], including precompiled expressions.
    pub fn with_filter(mut self, filter: impl Into<FilterSpec>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page_size, self.page)
    }
}

fn int_param(request: &ParamValue, key: &str, default: i64) -> Result<i64, PlanError> {
    match request.get(key) {
        None | Some(ParamValue::Scalar(Value::Null)) => Ok(default),
        Some(ParamValue::Scalar(Value::String(s))) if s.trim().is_empty() => Ok(default),
        Some(ParamValue::Scalar(value)) => value
            .as_i64()
            .ok_or_else(|| PlanError::invalid_param(key, format!("expected an integer, got {value}"))),
        Some(_) => Err(PlanError::invalid_param(key, "expected an integer")),
    }
}

fn string_param(request: &ParamValue, key: &str) -> Result<Option<String>, PlanError> {
    match request.get(key) {
        None | Some(ParamValue::Scalar(Value::Null)) => Ok(None),
        Some(ParamValue::Scalar(Value::String(s))) if s.is_empty() => Ok(None),
        Some(ParamValue::Scalar(Value::String(s))) => Ok(Some(s.clone())),
        Some(_) => Err(PlanError::invalid_param(key, "expected a string")),
    }
}

fn bindings(params: Option<&ParamValue>) -> Result<BTreeMap<String, Value>, PlanError> {
    match params {
        None | Some(ParamValue::Scalar(Value::Null)) => Ok(BTreeMap::new()),
        Some(ParamValue::Mapping(entries)) => Ok(entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect()),
        Some(ParamValue::Sequence(items)) if items.is_empty() => Ok(BTreeMap::new()),
        Some(_) => Err(PlanError::invalid_param(
            PARAMS,
            "expected a mapping of parameter names to values",
        )),
    }
}
