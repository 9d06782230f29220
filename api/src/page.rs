//! Server-rendered booking form.

use std::fmt::Write;

use crate::booking::{
    arrival_day_options, BookingInput, Choice, MarketSegment, MealPlan, RoomType, YesNo,
    MAX_ARRIVAL_YEAR, MIN_ARRIVAL_YEAR,
};
use crate::classifier::Prediction;

pub const TITLE: &str = "Hotel Booking Cancellation Predictor";
pub const SUBTITLE: &str = "Will this hotel booking be canceled or not?";

pub enum Banner {
    Success(Prediction),
    Error(String),
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn number_input(out: &mut String, name: &str, label: &str, value: u32, min: u32, max: Option<u32>) {
    let max = max.map(|m| format!(r#" max="{m}""#)).unwrap_or_default();
    let _ = write!(
        out,
        r#"<label for="{name}">{label}</label>
<input type="number" id="{name}" name="{name}" min="{min}"{max} step="1" value="{value}" required>
"#
    );
}

fn radio<C: Choice>(out: &mut String, name: &str, label: &str, selected: C) {
    let _ = writeln!(out, "<fieldset><legend>{label}</legend>");
    for option in C::ALL {
        let checked = if *option == selected { " checked" } else { "" };
        let value = escape(option.label());
        let _ = write!(
            out,
            r#"<label><input type="radio" name="{name}" value="{value}"{checked}> {value}</label>
"#
        );
    }
    out.push_str("</fieldset>\n");
}

fn select<C: Choice>(out: &mut String, name: &str, label: &str, selected: C) {
    let _ = write!(out, r#"<label for="{name}">{label}</label>
<select id="{name}" name="{name}">
"#);
    for option in C::ALL {
        let attr = if *option == selected { " selected" } else { "" };
        let value = escape(option.label());
        let _ = write!(out, r#"<option value="{value}"{attr}>{value}</option>
"#);
    }
    out.push_str("</select>\n");
}

fn month_select(out: &mut String, selected: u32) {
    out.push_str(
        r#"<label for="arrival_month">Arrival Month</label>
<select id="arrival_month" name="arrival_month">
"#,
    );
    for month in 1..=12 {
        let attr = if month == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{month}"{attr}>{month:02}</option>
"#);
    }
    out.push_str("</select>\n");
}

fn day_select(out: &mut String, month: u32, selected: u32) {
    out.push_str(
        r#"<label for="arrival_date">Arrival Day</label>
<select id="arrival_date" name="arrival_date">
"#,
    );
    let days = arrival_day_options(month).unwrap_or_else(|_| (1..=31).collect());
    for day in days {
        let attr = if day == selected { " selected" } else { "" };
        let _ = write!(out, r#"<option value="{day}"{attr}>{day}</option>
"#);
    }
    out.push_str("</select>\n");
}

// Refreshes the day picker when the month changes, keeping the chosen day when it still exists.
const DAY_SCRIPT: &str = r#"<script>
document.getElementById("arrival_month").addEventListener("change", async (event) => {
  const select = document.getElementById("arrival_date");
  const previous = Number(select.value);
  const response = await fetch(`/arrival-days/${event.target.value}`);
  if (!response.ok) return;
  const { days } = await response.json();
  select.replaceChildren(...days.map((day) => new Option(day, day, false, day === previous)));
});
</script>
"#;

pub fn render(booking: &BookingInput, banner: Option<&Banner>) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{TITLE}</title>
<style>
body {{ display: flex; margin: 0; font-family: sans-serif; }}
aside {{ width: 20rem; padding: 1rem; background: #f0f2f6; }}
aside label, aside select, aside input[type=number] {{ display: block; width: 100%; margin-top: .5rem; }}
main {{ flex: 1; padding: 2rem; }}
.success {{ background: #dff0d8; padding: 1rem; }}
.error {{ background: #f8d7da; padding: 1rem; }}
</style>
</head>
<body>
<aside>
<h2>{TITLE}</h2>
<p>{SUBTITLE}</p>
<h3>Booking Information</h3>
<form id="booking-form" method="post" action="/">
"#
    );

    number_input(&mut out, "no_of_adults", "Number of Adults", booking.no_of_adults, 0, None);
    number_input(&mut out, "no_of_children", "Number of Children", booking.no_of_children, 0, None);
    number_input(
        &mut out,
        "no_of_weekend_nights",
        "Number of Weekend Nights",
        booking.no_of_weekend_nights,
        0,
        None,
    );
    number_input(
        &mut out,
        "no_of_week_nights",
        "Number of Week Nights",
        booking.no_of_week_nights,
        0,
        None,
    );
    radio::<YesNo>(
        &mut out,
        "required_car_parking_space",
        "Car Parking Space Required?",
        booking.required_car_parking_space,
    );
    number_input(&mut out, "lead_time", "Lead Time (days)", booking.lead_time, 0, None);
    number_input(
        &mut out,
        "arrival_year",
        "Arrival Year",
        booking.arrival_year,
        MIN_ARRIVAL_YEAR,
        Some(MAX_ARRIVAL_YEAR),
    );
    month_select(&mut out, booking.arrival_month);
    day_select(&mut out, booking.arrival_month, booking.arrival_date);
    radio::<YesNo>(&mut out, "repeated_guest", "Repeated Guest?", booking.repeated_guest);
    number_input(
        &mut out,
        "no_of_previous_cancellations",
        "Previous Cancellations",
        booking.no_of_previous_cancellations,
        0,
        None,
    );
    number_input(
        &mut out,
        "no_of_previous_bookings_not_canceled",
        "Previous Bookings (Not Canceled)",
        booking.no_of_previous_bookings_not_canceled,
        0,
        None,
    );
    let _ = write!(
        out,
        r#"<label for="avg_price_per_room">Average Price per Room</label>
<input type="number" id="avg_price_per_room" name="avg_price_per_room" min="0" step="any" value="{:.2}" required>
"#,
        booking.avg_price_per_room
    );
    number_input(
        &mut out,
        "no_of_special_requests",
        "Number of Special Requests",
        booking.no_of_special_requests,
        0,
        None,
    );
    select::<MealPlan>(&mut out, "meal_plan", "Meal Plan", booking.meal_plan);
    select::<RoomType>(&mut out, "room_type", "Room Type Reserved", booking.room_type);
    select::<MarketSegment>(
        &mut out,
        "market_segment",
        "Market Segment Type",
        booking.market_segment,
    );

    let _ = write!(
        out,
        r#"</form>
</aside>
<main>
<h1>{TITLE}</h1>
<p>{SUBTITLE}</p>
<button type="submit" form="booking-form">Predict Booking Status</button>
"#
    );
    match banner {
        Some(Banner::Success(prediction)) => {
            let _ = write!(
                out,
                r#"<div class="success">Prediction: {prediction}</div>
"#
            );
        }
        Some(Banner::Error(message)) => {
            let _ = write!(
                out,
                r#"<div class="error">{}</div>
"#,
                escape(message)
            );
        }
        None => {}
    }
    out.push_str("</main>\n");
    out.push_str(DAY_SCRIPT);
    out.push_str("</body>\n</html>\n");
    out
}
