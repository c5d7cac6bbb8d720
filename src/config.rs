use serde::Deserialize;

const DEFAULT_SEPARATOR: &str = "__";
const DEFAULT_LIST_DELIMITER: char = ',';
const DEFAULT_ORDERING_PARAM: &str = "order_by";

/// Settings shared by the filter backends.
///
/// Pass the same value to both backends' `with_config`: the fields backend
/// only skips the ordering parameter named in its own copy.
///
/// Every field has a default, so a partial configuration can be deserialized:
///
/// ```rust
/// let config: fieldsfilter::FilterConfig =
///     serde_json::from_str(r#"{"ordering_param": "sort"}"#).unwrap();
/// assert_eq!(config.separator, "__");
/// assert_eq!(config.ordering_param, "sort");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Splits a parameter into field name and lookup postfix chain
    pub separator: String,
    /// Splits list values for `in` and `range` lookups
    pub list_delimiter: char,
    /// Query parameter read by the ordering backend
    pub ordering_param: String,
    /// Parameters the fields backend never treats as filters
    pub ignored_params: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            list_delimiter: DEFAULT_LIST_DELIMITER,
            ordering_param: DEFAULT_ORDERING_PARAM.to_string(),
            ignored_params: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Whether the fields backend should skip this parameter
    #[must_use]
    pub fn is_ignored(&self, param: &str) -> bool {
        param == self.ordering_param || self.ignored_params.iter().any(|p| p == param)
    }

    /// Split `value` on the list delimiter
    #[must_use]
    pub fn split_list<'a>(&self, value: &'a str) -> Vec<&'a str> {
        value.split(self.list_delimiter).collect()
    }
}
