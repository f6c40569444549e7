// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Parsing helpers shared across the client.

use std::time::{SystemTime, UNIX_EPOCH};

/// Normalizes an event name to its slug form.
///
/// Lower-cases ASCII alphanumerics, replaces runs of any other characters with
/// a single `-`, and trims separators from both ends. The wildcard characters
/// `*` and `?` are preserved so that listener patterns survive normalization.
#[must_use]
pub fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() || c == '*' || c == '?' {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Returns the human-readable reason for a WebSocket close code.
#[must_use]
pub const fn close_reason(code: u16) -> &'static str {
    match code {
        1000 => "Normal closure",
        1001 => "Going away",
        1002 => "Protocol error",
        1003 => "Unsupported data",
        1006 => "Abnormal closure",
        1007 => "Invalid data",
        1008 => "Policy violation",
        1009 => "Message too big",
        1010 => "Mandatory extension",
        1011 => "Internal server error",
        _ => "Unknown error",
    }
}

/// Returns milliseconds since the Unix epoch.
#[must_use]
pub fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Reward Redeemed", "reward-redeemed")]
    #[case("  whisper_received  ", "whisper-received")]
    #[case("PONG", "pong")]
    #[case("bits", "bits")]
    #[case("--already--slugged--", "already-slugged")]
    #[case("!!!", "")]
    #[case("", "")]
    #[case("channel-points-channel-v1.12345", "channel-points-channel-v1-12345")]
    #[case("sub*", "sub*")]
    #[case("re?ard", "re?ard")]
    #[case("*", "*")]
    fn test_slug(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slug(input), expected);
    }

    #[rstest]
    #[case(1000, "Normal closure")]
    #[case(1001, "Going away")]
    #[case(1002, "Protocol error")]
    #[case(1003, "Unsupported data")]
    #[case(1006, "Abnormal closure")]
    #[case(1007, "Invalid data")]
    #[case(1008, "Policy violation")]
    #[case(1009, "Message too big")]
    #[case(1010, "Mandatory extension")]
    #[case(1011, "Internal server error")]
    #[case(1005, "Unknown error")]
    #[case(4000, "Unknown error")]
    fn test_close_reason(#[case] code: u16, #[case] expected: &str) {
        assert_eq!(close_reason(code), expected);
    }

    #[rstest]
    fn test_unix_ms_nonzero() {
        assert!(unix_ms() > 0);
    }
}
