use chrono::NaiveDate;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

/// Current value of the input, select or textarea an event came from
pub fn input_value<E: TargetCast>(e: &E) -> String {
    if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
        select.value()
    } else if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

/// `oninput` handler writing the field's text into one member of a form state
pub fn bind_input<T>(form: &UseStateHandle<T>, apply: fn(&mut T, String)) -> Callback<InputEvent>
where
    T: Clone + 'static,
{
    let form = form.clone();
    Callback::from(move |e: InputEvent| {
        let mut next = (*form).clone();
        apply(&mut next, input_value(&e));
        form.set(next);
    })
}

/// Same as [`bind_input`] for `SelectField`'s string callback
pub fn bind_select<T>(form: &UseStateHandle<T>, apply: fn(&mut T, String)) -> Callback<String>
where
    T: Clone + 'static,
{
    let form = form.clone();
    Callback::from(move |value: String| {
        let mut next = (*form).clone();
        apply(&mut next, value);
        form.set(next);
    })
}

/// Trimmed text, `None` when blank
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_date(label: &str, value: &str) -> Result<NaiveDate, String> {
    match value.trim() {
        "" => Err(format!("{} is required", label)),
        v => NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| format!("{} is not a valid date", label)),
    }
}

pub fn parse_opt_date(label: &str, value: &str) -> Result<Option<NaiveDate>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(label, value).map(Some)
    }
}

pub fn parse_int(label: &str, value: &str) -> Result<i64, String> {
    match value.trim() {
        "" => Err(format!("{} is required", label)),
        v => v.parse().map_err(|_| format!("{} must be a whole number", label)),
    }
}

pub fn parse_opt_int(label: &str, value: &str) -> Result<Option<i64>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_int(label, value).map(Some)
    }
}

pub fn parse_amount(label: &str, value: &str) -> Result<f64, String> {
    match value.trim() {
        "" => Err(format!("{} is required", label)),
        v => match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(format!("{} must be a number", label)),
        },
    }
}

pub fn parse_opt_amount(label: &str, value: &str) -> Result<Option<f64>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(label, value).map(Some)
    }
}

/// A select's value as an id; empty means nothing chosen
pub fn selected_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" Rex "), Some("Rex".to_string()));
    }

    #[test]
    fn test_parse_required_and_optional() {
        assert_eq!(parse_int("Born alive", "6"), Ok(6));
        assert_eq!(parse_int("Born alive", ""), Err("Born alive is required".to_string()));
        assert_eq!(parse_opt_int("Weaned", ""), Ok(None));
        assert!(parse_opt_int("Weaned", "x").is_err());
        assert_eq!(parse_amount("Price", "12.5"), Ok(12.5));
        assert_eq!(parse_opt_amount("Cost", " "), Ok(None));
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(parse_date("Date", "2024-02-29"), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(parse_date("Date", "2023-02-29").is_err());
        assert_eq!(parse_opt_date("Birth date", ""), Ok(None));
    }

    #[test]
    fn test_selected_id() {
        assert_eq!(selected_id(""), None);
        assert_eq!(selected_id("12"), Some(12));
    }
}
