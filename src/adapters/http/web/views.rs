//! Minimal HTML pages.

use crate::domain::foundation::UserId;

pub(super) fn login_page(error: Option<&str>) -> String {
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html>
<head><title>Login</title></head>
<body>
<h1>Login</h1>
{error}
<form method="post" action="/login">
  <label>Username <input name="username" autofocus></label>
  <label>Password <input name="password" type="password"></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#
    )
}

pub(super) fn index_page(user_id: &UserId) -> String {
    let user = escape(user_id.as_str());
    format!(
        r#"<!doctype html>
<html>
<head><title>Push Hub</title></head>
<body>
<h1>Hello, {user}</h1>
<p><a href="/logout">Log out</a></p>
<pre id="events"></pre>
<script>
  const events = document.getElementById("events");
  const scheme = location.protocol === "https:" ? "wss" : "ws";
  const socket = new WebSocket(`${{scheme}}://${{location.host}}/ws`);
  socket.onmessage = (e) => {{ events.textContent = e.data + "\n" + events.textContent; }};
  socket.onclose = (e) => {{ if (e.code === 1008) location.href = "/login"; }};
</script>
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_escapes_user_name() {
        let page = index_page(&UserId::new("<b>eve</b>").unwrap());
        assert!(page.contains("Hello, &lt;b&gt;eve&lt;/b&gt;"));
        assert!(!page.contains("<b>eve"));
    }

    #[test]
    fn login_page_shows_error_only_when_given() {
        assert!(!login_page(None).contains("class=\"error\""));
        assert!(login_page(Some("Invalid username or password")).contains("Invalid username"));
    }
}
