//! auth::html
//!
//! Static page served on a successful loopback OAuth redirect. Rejected
//! redirects get the bare error message as the whole response body so
//! callers and tests can match it byte for byte.

/// Shown after a successful login; closes itself after five seconds.
pub const LOGGED_IN_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Logged in</title>
    <style>
      body { font-family: system-ui, sans-serif; text-align: center; margin-top: 15vh; color: #273139; }
      p { color: #526069; }
    </style>
    <script>
      setTimeout(function () { window.close(); }, 5000);
    </script>
  </head>
  <body>
    <h1>You have successfully logged in</h1>
    <p>You can close this window and return to the terminal.</p>
  </body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_page_auto_closes() {
        assert!(LOGGED_IN_PAGE_HTML.contains("window.close()"));
        assert!(LOGGED_IN_PAGE_HTML.contains("5000"));
    }
}
