//! Bracket validation and the on-demand jump scans.
//!
//! There is no precomputed jump table: the interpreter rescans the source
//! each time a jump is taken, counting nesting depth until the matching
//! bracket is found.

use std::fmt;

use crate::interpreter::InterpreterError;

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Returns `true` when the brackets in `code` form a valid Dyck sequence:
/// the running count of `[` minus `]` never goes negative and ends at zero.
/// Every other character is ignored.
pub fn validate_brackets(code: &str) -> bool {
    let mut depth: usize = 0;
    for c in code.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                let Some(d) = depth.checked_sub(1) else {
                    return false;
                };
                depth = d;
            }
            _ => {}
        }
    }
    depth == 0
}

/// Like [`validate_brackets`] but reports where the program went wrong.
///
/// A `]` that closes nothing is reported at its own index. When `[`s remain
/// open at the end, the innermost unclosed one is reported.
pub fn check_brackets(chars: &[char]) -> Result<(), InterpreterError> {
    let mut open: Vec<usize> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '[' {
            open.push(i);
        } else if c == ']' && open.pop().is_none() {
            return Err(InterpreterError::InvalidProgram {
                ip: i,
                kind: UnmatchedBracketKind::Close,
            });
        }
    }

    if let Some(&unmatched_open) = open.last() {
        return Err(InterpreterError::InvalidProgram {
            ip: unmatched_open,
            kind: UnmatchedBracketKind::Open,
        });
    }
    Ok(())
}

/// Index of the `]` matching the `[` at `open`.
///
/// Scans forward from `open + 1` with a nesting counter starting at 1.
/// Returns `None` only for unbalanced input.
pub fn scan_forward(chars: &[char], open: usize) -> Option<usize> {
    let mut depth: usize = 1;
    for (i, &c) in chars.iter().enumerate().skip(open + 1) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `[` matching the `]` at `close`.
///
/// Scans backward from `close - 1` with a nesting counter starting at 1.
/// Returns `None` only for unbalanced input.
pub fn scan_backward(chars: &[char], close: usize) -> Option<usize> {
    let mut depth: usize = 1;
    for i in (0..close.min(chars.len())).rev() {
        match chars[i] {
            ']' => depth += 1,
            '[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    /// Every string over `[`, `]` and `+` up to `max_len`.
    fn all_strings(max_len: usize) -> Vec<String> {
        let mut out = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for s in &frontier {
                for c in ['[', ']', '+'] {
                    let mut t = s.clone();
                    t.push(c);
                    next.push(t);
                }
            }
            out.extend(next.iter().cloned());
            frontier = next;
        }
        out
    }

    /// Reference Dyck check: repeatedly erase adjacent "[]" pairs.
    fn is_dyck(s: &str) -> bool {
        let mut b: String = s.chars().filter(|c| matches!(c, '[' | ']')).collect();
        while b.contains("[]") {
            b = b.replace("[]", "");
        }
        b.is_empty()
    }

    #[test]
    fn accepts_balanced_programs() {
        assert!(validate_brackets(""));
        assert!(validate_brackets("[]"));
        assert!(validate_brackets("+[-[>+<]]."));
        assert!(validate_brackets("comments [ are ] fine"));
    }

    #[test]
    fn rejects_unbalanced_programs() {
        assert!(!validate_brackets("["));
        assert!(!validate_brackets("]"));
        assert!(!validate_brackets("+["));
        assert!(!validate_brackets("][")); // equal counts, negative prefix
        assert!(!validate_brackets("[]]["));
    }

    #[test]
    fn validation_matches_dyck_property() {
        for s in all_strings(8) {
            assert_eq!(validate_brackets(&s), is_dyck(&s), "program {s:?}");
            assert_eq!(check_brackets(&chars(&s)).is_ok(), is_dyck(&s), "program {s:?}");
        }
    }

    #[test]
    fn check_reports_stray_close_position() {
        let err = check_brackets(&chars("+[]]")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::InvalidProgram { ip: 3, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn check_reports_innermost_unclosed_open() {
        let err = check_brackets(&chars("[[+]+[")).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::InvalidProgram { ip: 5, kind: UnmatchedBracketKind::Open }
        ));
    }

    #[test]
    fn scans_find_matching_brackets() {
        let code = chars("+[>[-]<[+]]-");
        assert_eq!(scan_forward(&code, 1), Some(10));
        assert_eq!(scan_forward(&code, 3), Some(5));
        assert_eq!(scan_forward(&code, 7), Some(9));
        assert_eq!(scan_backward(&code, 10), Some(1));
        assert_eq!(scan_backward(&code, 5), Some(3));
        assert_eq!(scan_backward(&code, 9), Some(7));
    }

    #[test]
    fn scans_agree_with_each_other_on_balanced_input() {
        for s in all_strings(8).into_iter().filter(|s| validate_brackets(s)) {
            let code = chars(&s);
            for (i, &c) in code.iter().enumerate() {
                if c == '[' {
                    let close = scan_forward(&code, i).expect("balanced");
                    assert_eq!(code[close], ']');
                    assert_eq!(scan_backward(&code, close), Some(i), "program {s:?}");
                }
            }
        }
    }

    #[test]
    fn scans_fail_on_unbalanced_input() {
        assert_eq!(scan_forward(&chars("[+"), 0), None);
        assert_eq!(scan_backward(&chars("+]"), 1), None);
    }
}
