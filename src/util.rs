//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  // Back off to a char boundary so we never split a multi-byte sequence.
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Strip a Markdown code fence wrapper from model output, if present.
/// Models occasionally wrap the JSON array in ```json ... ``` despite the
/// instructions; the payload inside is what we want.
pub fn strip_code_fences(s: &str) -> &str {
  let t = s.trim();
  let Some(rest) = t.strip_prefix("```") else { return t };
  let Some(nl) = rest.find('\n') else { return t };
  let inner = &rest[nl + 1..];
  match inner.rfind("```") {
    Some(end) => inner[..end].trim(),
    None => t,
  }
}

/// Split a `data:` URI into (media type, base64 payload).
/// Only base64-encoded URIs are accepted, e.g. `data:application/pdf;base64,AAAA`.
pub fn parse_data_uri(s: &str) -> Option<(&str, &str)> {
  let rest = s.strip_prefix("data:")?;
  let (meta, payload) = rest.split_once(',')?;
  let media_type = meta.strip_suffix(";base64")?;
  Some((media_type, payload))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trunc_short_strings_untouched() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    let s = "héllo wörld, this is long";
    let out = trunc_for_log(s, 2);
    assert!(out.starts_with('h'));
    assert!(out.contains("bytes total"));
  }

  #[test]
  fn strips_json_fences() {
    let s = "```json\n[{\"term\":\"a\"}]\n```";
    assert_eq!(strip_code_fences(s), "[{\"term\":\"a\"}]");
  }

  #[test]
  fn unfenced_text_passes_through() {
    assert_eq!(strip_code_fences("  [1,2]  "), "[1,2]");
  }

  #[test]
  fn unterminated_fence_passes_through() {
    let s = "```json\n[1,2]";
    assert_eq!(strip_code_fences(s), s);
  }

  #[test]
  fn parses_pdf_data_uri() {
    let (media_type, payload) = parse_data_uri("data:application/pdf;base64,JVBERg==").unwrap();
    assert_eq!(media_type, "application/pdf");
    assert_eq!(payload, "JVBERg==");
  }

  #[test]
  fn rejects_non_base64_and_malformed_uris() {
    assert!(parse_data_uri("data:text/plain,hello").is_none());
    assert!(parse_data_uri("application/pdf;base64,AAAA").is_none());
    assert!(parse_data_uri("data:application/pdf;base64").is_none());
  }
}
