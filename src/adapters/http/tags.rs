use dicom_core::Tag;

pub const TAG_QUERY_PARAM: &str = "tag";

/// Parse a tag written as `(gggg,eeee)`; the parentheses and zero padding
/// are optional.
pub fn parse_tag(input: &str) -> Result<Tag, String> {
    let trimmed = input.trim_matches(|c| c == '(' || c == ')');
    let mut parts = trimmed.split(',');

    let (Some(group), Some(element)) = (parts.next(), parts.next()) else {
        return Err(format!("malformed tag: {}", input));
    };

    let group = u16::from_str_radix(group.trim(), 16)
        .map_err(|e| format!("malformed tag group in {}: {}", input, e))?;
    let element = u16::from_str_radix(element.trim(), 16)
        .map_err(|e| format!("malformed tag element in {}: {}", input, e))?;

    Ok(Tag(group, element))
}

/// All values of `key` in a raw query string, in order of appearance
pub fn query_values(query: Option<&str>, key: &str) -> Vec<String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse every `tag` query parameter
pub fn parse_tag_query(query: Option<&str>) -> Result<Vec<Tag>, String> {
    query_values(query, TAG_QUERY_PARAM)
        .iter()
        .map(|value| parse_tag(value))
        .collect()
}
