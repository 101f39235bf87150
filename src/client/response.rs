use std::fmt::{Display, Formatter, Result as FmtResult};

use bytes::Bytes;

/// Body of a failed response, displayed as a suffix of the error message.
pub struct ResponseBody(String);

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self(String::from_utf8_lossy(&bytes).trim().to_owned())
    }
}

impl Display for ResponseBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "; Response: {}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_displays_nothing() {
        let body = ResponseBody::from(Bytes::from_static(b"  \n"));

        assert_eq!(body.to_string(), "");
    }

    #[test]
    fn body_is_appended() {
        let body = ResponseBody::from(Bytes::from_static(br#"{"error":"Not found"}"#));

        assert_eq!(body.to_string(), r#"; Response: {"error":"Not found"}"#);
    }
}
