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

//! Wildcard matching for event-name listener patterns.

use smallvec::SmallVec;

/// Matches an event name against a listener pattern using iterative
/// backtracking.
///
/// Pattern characters:
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
/// - anything else matches itself
#[must_use]
pub fn pattern_matches(name: &str, pattern: &str) -> bool {
    is_matching(name.as_bytes(), pattern.as_bytes())
}

#[must_use]
pub fn is_matching(name: &[u8], pattern: &[u8]) -> bool {
    // Backtracking states (name_idx, pattern_idx); SmallVec keeps patterns
    // with ≤16 wildcards off the heap
    let mut stack: SmallVec<[(usize, usize); 16]> = SmallVec::new();
    stack.push((0, 0));

    while let Some((mut i, mut j)) = stack.pop() {
        loop {
            if i == name.len() && j == pattern.len() {
                return true;
            }

            if j == pattern.len() {
                break;
            }

            if pattern[j] == b'*' {
                // Try consuming nothing first, revisit with one more character
                // consumed if that path fails
                stack.push((i, j + 1));

                if i < name.len() {
                    i += 1;
                    continue;
                }
                break;
            } else if i < name.len() && (pattern[j] == b'?' || name[i] == pattern[j]) {
                i += 1;
                j += 1;
                continue;
            }

            break;
        }
    }

    false
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("pong", "*", true)]
    #[case("pong", "pong", true)]
    #[case("pong", "ping", false)]
    #[case("reward-redeemed", "reward*", true)]
    #[case("reward-redeemed", "reward-redeemed*", true)]
    #[case("reward-redeemed", "*redeemed", true)]
    #[case("reward-redeemed", "reward-?edeemed", true)]
    #[case("reward-redeemed", "reward-??", false)]
    #[case("whisper-received", "whisper-*", true)]
    #[case("whisper-received", "w*d", true)]
    #[case("subscribed", "sub*", true)]
    #[case("unsubscribed", "sub*", false)]
    #[case("", "*", true)]
    #[case("", "?", false)]
    fn test_pattern_matches(#[case] name: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(pattern_matches(name, pattern), expected);
    }
}
