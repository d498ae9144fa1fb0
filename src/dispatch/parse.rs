//! Reading values out of free-form answers

use chrono::NaiveDateTime;

/// Minutes from a spoken answer like "20", "in 20 minutes" or "uh twenty"
///
/// Digits win: every ASCII digit in the answer is concatenated and parsed,
/// so "1 0" is 10. Without digits, English number words are added up.
/// Returns None when neither yields a number or the value overflows.
pub fn parse_minutes(answer: &str) -> Option<i64> {
    let digits: String = answer.chars().filter(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }

    parse_number_words(answer)
}

/// Sum the English number words in `text`, skipping any other words
///
/// Handles "twenty five", "twenty-five", "a hundred and ten",
/// "two thousand". Returns None if no number word appears.
pub fn parse_number_words(text: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut current: i64 = 0;
    let mut seen = false;

    for word in text.split(|c: char| c.is_whitespace() || c == '-') {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if let Some(value) = small_number(&word) {
            current = current.checked_add(value)?;
            seen = true;
        } else if word == "hundred" {
            current = current.max(1).checked_mul(100)?;
            seen = true;
        } else if word == "thousand" {
            total = total.checked_add(current.max(1).checked_mul(1000)?)?;
            current = 0;
            seen = true;
        }
    }

    seen.then(|| total.checked_add(current)).flatten()
}

fn small_number(word: &str) -> Option<i64> {
    let value = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(value)
}

/// "03:07 PM"
pub fn format_time(now: &NaiveDateTime) -> String {
    now.format("%I:%M %p").to_string()
}

/// "March 05, 2024"
pub fn format_date(now: &NaiveDateTime) -> String {
    now.format("%B %d, %Y").to_string()
}
