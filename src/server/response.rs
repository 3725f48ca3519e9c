use may_minihttp::Response;
use serde_json::Value;

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        100..=199 => "Informational",
        202..=299 => "Success",
        300..=399 => "Redirection",
        402..=499 => "Client Error",
        501..=599 => "Server Error",
        _ => "Unknown",
    }
}

/// A complete response, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into().into_bytes(),
        }
    }

    /// Compact JSON body.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub fn yaml(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/yaml",
            body: body.into_bytes(),
        }
    }

    /// Pretty-printed JSON body.
    pub fn json_pretty(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.into_bytes(),
        }
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }
}

pub fn write_reply(res: &mut Response, reply: Reply) {
    res.status_code(usize::from(reply.status), status_reason(reply.status));
    res.header(match reply.content_type {
        "application/json" => "Content-Type: application/json",
        "application/yaml" => "Content-Type: application/yaml",
        _ => "Content-Type: text/plain",
    });
    res.body_vec(reply.body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(429), "Too Many Requests");
    }

    #[test]
    fn test_unlisted_status_reason_follows_its_class() {
        assert_eq!(status_reason(302), "Redirection");
        assert_eq!(status_reason(418), "Client Error");
        assert_eq!(status_reason(502), "Server Error");
        assert_eq!(status_reason(202), "Success");
        assert_eq!(status_reason(101), "Informational");
        assert_eq!(status_reason(999), "Unknown");
    }

    #[test]
    fn test_reply_constructors() {
        let r = Reply::json(200, &json!({ "status": "ok" }));
        assert_eq!(r.body_str(), r#"{"status":"ok"}"#);
        assert_eq!(r.content_type, "application/json");
        assert_eq!(Reply::text(404, "Not Found").body_str(), "Not Found");
    }
}
