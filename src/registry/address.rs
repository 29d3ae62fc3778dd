//! Address shape validation.
//!
//! Accepts a dotted-quad IPv4 literal or `localhost`, each optionally followed
//! by `:` and a run of decimal digits. Octet values and port ranges are not
//! checked: `999.999.999.999:99999` is accepted.

const LOCALHOST: &str = "localhost";

/// Returns true if `candidate` denotes a usable `host[:port]`.
pub fn is_valid_address(candidate: &str) -> bool {
    let (host, port) = match candidate.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (candidate, None),
    };

    if let Some(port) = port {
        if !is_digits(port) {
            return false;
        }
    }

    host == LOCALHOST || is_dotted_quad(host)
}

fn is_dotted_quad(host: &str) -> bool {
    let mut octets = 0;
    for octet in host.split('.') {
        if octet.len() > 3 || !is_digits(octet) {
            return false;
        }
        octets += 1;
    }
    octets == 4
}

/// Non-empty and ASCII digits only.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ipv4_with_and_without_port() {
        assert!(is_valid_address("192.168.1.1"));
        assert!(is_valid_address("192.168.1.1:8080"));
        assert!(is_valid_address("10.0.0.5:1"));
        assert!(is_valid_address("0.0.0.0"));
    }

    #[test]
    fn accepts_localhost() {
        assert!(is_valid_address("localhost"));
        assert!(is_valid_address("localhost:6010"));
    }

    #[test]
    fn permissive_about_ranges() {
        assert!(is_valid_address("999.999.999.999"));
        assert!(is_valid_address("1.2.3.4:999999"));
        assert!(is_valid_address("localhost:0"));
    }

    #[test]
    fn rejects_other_shapes() {
        for candidate in [
            "",
            "bad ip",
            "example.com",
            "tablet-1",
            "LOCALHOST",
            "::1",
            "[::1]:80",
            "fe80::1",
            "1.2.3",
            "1.2.3.4.5",
            "1.2.3.",
            ".1.2.3",
            "1..2.3",
            "1234.1.1.1",
            "1.2.3.4:",
            "1.2.3.4:80:90",
            "1.2.3.4:abc",
            "localhost:",
            ":8080",
            " 1.2.3.4",
            "1.2.3.4 ",
            "http://1.2.3.4",
            "1.2.3.4/path",
            "١.٢.٣.٤",
        ] {
            assert!(!is_valid_address(candidate), "{candidate:?} should be rejected");
        }
    }
}
