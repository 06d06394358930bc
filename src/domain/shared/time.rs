use chrono::{DateTime, Local, TimeZone, Utc};

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * MINUTE_SECS;
const DAY_SECS: i64 = 24 * HOUR_SECS;
const WEEK_SECS: i64 = 7 * DAY_SECS;

pub const PRICE_ON_REQUEST: &str = "price on request";

/// `YYYY-MM-DD HH:MM` in the given time zone
pub fn format_minute<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d %H:%M").to_string()
}

pub fn relative_time(then: DateTime<Utc>) -> String {
    relative_time_at(then, Utc::now())
}

/// Human text for how long ago `then` was, seen from `now`.
/// Anything a week or older (or in the future by more than a minute of
/// clock skew) falls back to the absolute local timestamp.
pub fn relative_time_at(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - then).num_seconds();

    match elapsed {
        e if e < MINUTE_SECS && e > -MINUTE_SECS => "just now".to_string(),
        e if (MINUTE_SECS..HOUR_SECS).contains(&e) => {
            plural(e / MINUTE_SECS, "minute")
        }
        e if (HOUR_SECS..DAY_SECS).contains(&e) => plural(e / HOUR_SECS, "hour"),
        e if (DAY_SECS..WEEK_SECS).contains(&e) => plural(e / DAY_SECS, "day"),
        _ => format_minute(&then.with_timezone(&Local)),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// `¥` with thousands separators and at most two decimals; zero, missing or
/// non-finite prices read as "price on request"
pub fn format_price(price: Option<f64>) -> String {
    let price = match price {
        Some(p) if p.is_finite() && p != 0.0 => p,
        _ => return PRICE_ON_REQUEST.to_string(),
    };

    let cents = (price.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 { "-" } else { "" };
    match fraction {
        0 => format!("{}¥{}", sign, grouped),
        f if f % 10 == 0 => format!("{}¥{}.{}", sign, grouped, f / 10),
        f => format!("{}¥{}.{:02}", sign, grouped, f),
    }
}
