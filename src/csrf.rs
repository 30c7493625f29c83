use crate::dom::{Document, Tag};
use crate::error::CsrfError;

pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const CSRF_COOKIE: &str = "csrftoken";
/// Length sanity check only; Django tokens are 32 or 64 characters.
pub const MIN_TOKEN_LEN: usize = 32;

/// Looks the token up in order: the hidden field inside `scope` (or anywhere
/// on the page when no scope is given), the `csrftoken` cookie, then any form
/// on the page that carries the hidden field.
///
/// A scoped first lookup reads the token the acting form was rendered with;
/// the cookie is the live value and outranks tokens held by unrelated forms.
pub fn find_token(doc: &Document, scope: Option<&str>) -> Option<String> {
    let from_field = doc
        .find_named(scope, CSRF_FIELD)
        .and_then(|id| doc.value(&id).map(str::to_string))
        .filter(|token| !token.is_empty());
    if from_field.is_some() {
        return from_field;
    }

    if let Some(token) = cookie_value(doc.cookie(), CSRF_COOKIE) {
        return Some(token.to_string());
    }

    let token = doc.elements_with_tag(Tag::Form).into_iter().find_map(|form| {
        doc.find_named(Some(&form), CSRF_FIELD)
            .and_then(|id| doc.value(&id).map(str::to_string))
            .filter(|token| !token.is_empty())
    });
    if token.is_none() {
        tracing::error!(cookie = doc.cookie(), "CSRF token not found");
    }
    token
}

pub fn validated_token(doc: &Document, scope: Option<&str>) -> Result<String, CsrfError> {
    let token = find_token(doc, scope).ok_or(CsrfError::Missing)?;
    if token.len() < MIN_TOKEN_LEN {
        tracing::error!(length = token.len(), "Invalid CSRF token");
        return Err(CsrfError::TooShort(token.len()));
    }
    Ok(token)
}

pub fn cookie_value<'a>(cookie: &'a str, name: &str) -> Option<&'a str> {
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
