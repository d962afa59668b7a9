//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings (char-boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Percent-encode everything outside the URI unreserved set (UTF-8 bytes).
pub fn percent_encode(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for b in s.bytes() {
    if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
      out.push(b as char);
    } else {
      out.push_str(&format!("%{:02X}", b));
    }
  }
  out
}

/// Inverse of `percent_encode`. Malformed escapes are kept literally and
/// invalid UTF-8 is replaced.
pub fn percent_decode(s: &str) -> String {
  let bytes = s.as_bytes();
  let mut out = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    if bytes[i] == b'%' && i + 2 < bytes.len() {
      let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
      if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
        out.push(v);
        i += 3;
        continue;
      }
    }
    out.push(bytes[i]);
    i += 1;
  }
  String::from_utf8_lossy(&out).into_owned()
}

/// Strip a surrounding ``` / ```json fence that some models wrap JSON in.
pub fn strip_code_fences(s: &str) -> &str {
  let t = s.trim();
  let Some(rest) = t.strip_prefix("```") else { return t };
  let rest = match rest.find('\n') {
    Some(nl) => &rest[nl + 1..],
    None => rest,
  };
  rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// `Test_<topic>.docx`, whitespace runs collapsed to `_`.
pub fn export_file_name(topic: &str) -> String {
  let joined = topic.split_whitespace().collect::<Vec<_>>().join("_");
  let stem = if joined.is_empty() { "English".to_string() } else { joined };
  format!("Test_{stem}.docx")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn percent_round_trip_keeps_unicode() {
    let s = "C1||phổ biến";
    assert_eq!(percent_decode(&percent_encode(s)), s);
    assert_eq!(percent_decode("100%"), "100%");
    assert_eq!(percent_decode("%zz1"), "%zz1");
  }

  #[test]
  fn fences_are_removed() {
    assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
  }

  #[test]
  fn file_name_collapses_whitespace() {
    assert_eq!(export_file_name("  Climate   change\tnow "), "Test_Climate_change_now.docx");
    assert_eq!(export_file_name(""), "Test_English.docx");
  }

  #[test]
  fn escapes_markup() {
    assert_eq!(escape_html(r#"<b>"x" & y</b>"#), "&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;");
  }
}
