use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_ARRIVAL_YEAR: u32 = 2000;
pub const MAX_ARRIVAL_YEAR: u32 = 2100;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("arrival month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("arrival year must be between 2000 and 2100, got {0}")]
    InvalidYear(u32),
    #[error("arrival day {day} is not offered for month {month:02}")]
    InvalidDay { month: u32, day: u32 },
    #[error("average price per room must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("{field}: {value:?} is not a valid value")]
    InvalidField { field: &'static str, value: String },
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// A fixed set of options rendered as a radio group or select box.
pub trait Choice: Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum YesNo {
    #[default]
    No,
    Yes,
}

impl YesNo {
    pub fn flag(self) -> u8 {
        match self {
            YesNo::No => 0,
            YesNo::Yes => 1,
        }
    }
}

impl Choice for YesNo {
    const ALL: &'static [Self] = &[YesNo::No, YesNo::Yes];

    fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum MealPlan {
    #[default]
    #[serde(rename = "Meal Plan 1")]
    MealPlan1,
    #[serde(rename = "Meal Plan 2")]
    MealPlan2,
    #[serde(rename = "Meal Plan 3")]
    MealPlan3,
    #[serde(rename = "No Need Meal")]
    NoNeedMeal,
}

impl Choice for MealPlan {
    const ALL: &'static [Self] = &[
        MealPlan::MealPlan1,
        MealPlan::MealPlan2,
        MealPlan::MealPlan3,
        MealPlan::NoNeedMeal,
    ];

    fn label(self) -> &'static str {
        match self {
            MealPlan::MealPlan1 => "Meal Plan 1",
            MealPlan::MealPlan2 => "Meal Plan 2",
            MealPlan::MealPlan3 => "Meal Plan 3",
            MealPlan::NoNeedMeal => "No Need Meal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum RoomType {
    #[default]
    #[serde(rename = "Room_Type 1")]
    RoomType1,
    #[serde(rename = "Room_Type 2")]
    RoomType2,
    #[serde(rename = "Room_Type 3")]
    RoomType3,
    #[serde(rename = "Room_Type 4")]
    RoomType4,
    #[serde(rename = "Room_Type 5")]
    RoomType5,
    #[serde(rename = "Room_Type 6")]
    RoomType6,
    #[serde(rename = "Room_Type 7")]
    RoomType7,
}

impl Choice for RoomType {
    const ALL: &'static [Self] = &[
        RoomType::RoomType1,
        RoomType::RoomType2,
        RoomType::RoomType3,
        RoomType::RoomType4,
        RoomType::RoomType5,
        RoomType::RoomType6,
        RoomType::RoomType7,
    ];

    fn label(self) -> &'static str {
        match self {
            RoomType::RoomType1 => "Room_Type 1",
            RoomType::RoomType2 => "Room_Type 2",
            RoomType::RoomType3 => "Room_Type 3",
            RoomType::RoomType4 => "Room_Type 4",
            RoomType::RoomType5 => "Room_Type 5",
            RoomType::RoomType6 => "Room_Type 6",
            RoomType::RoomType7 => "Room_Type 7",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum MarketSegment {
    #[default]
    Aviation,
    Complementary,
    Corporate,
    Offline,
    Online,
}

impl Choice for MarketSegment {
    const ALL: &'static [Self] = &[
        MarketSegment::Aviation,
        MarketSegment::Complementary,
        MarketSegment::Corporate,
        MarketSegment::Offline,
        MarketSegment::Online,
    ];

    fn label(self) -> &'static str {
        match self {
            MarketSegment::Aviation => "Aviation",
            MarketSegment::Complementary => "Complementary",
            MarketSegment::Corporate => "Corporate",
            MarketSegment::Offline => "Offline",
            MarketSegment::Online => "Online",
        }
    }
}

macro_rules! display_by_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_by_label!(YesNo, MealPlan, RoomType, MarketSegment);

/// Attributes of a single booking as entered in the form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingInput {
    pub no_of_adults: u32,
    pub no_of_children: u32,
    pub no_of_weekend_nights: u32,
    pub no_of_week_nights: u32,
    pub required_car_parking_space: YesNo,
    pub lead_time: u32,
    pub arrival_year: u32,
    pub arrival_month: u32,
    pub arrival_date: u32,
    pub repeated_guest: YesNo,
    pub no_of_previous_cancellations: u32,
    pub no_of_previous_bookings_not_canceled: u32,
    pub avg_price_per_room: f64,
    pub no_of_special_requests: u32,
    pub meal_plan: MealPlan,
    pub room_type: RoomType,
    pub market_segment: MarketSegment,
}

impl Default for BookingInput {
    fn default() -> Self {
        Self {
            no_of_adults: 0,
            no_of_children: 0,
            no_of_weekend_nights: 0,
            no_of_week_nights: 0,
            required_car_parking_space: YesNo::No,
            lead_time: 0,
            arrival_year: MIN_ARRIVAL_YEAR,
            arrival_month: 1,
            arrival_date: 1,
            repeated_guest: YesNo::No,
            no_of_previous_cancellations: 0,
            no_of_previous_bookings_not_canceled: 0,
            avg_price_per_room: 0.0,
            no_of_special_requests: 0,
            meal_plan: MealPlan::default(),
            room_type: RoomType::default(),
            market_segment: MarketSegment::default(),
        }
    }
}

impl BookingInput {
    /// Counts are unsigned, so only the calendar fields and the price need checking.
    pub fn validate(&self) -> Result<(), BookingError> {
        if !(MIN_ARRIVAL_YEAR..=MAX_ARRIVAL_YEAR).contains(&self.arrival_year) {
            return Err(BookingError::InvalidYear(self.arrival_year));
        }
        let days = days_in_month(self.arrival_month)?;
        if self.arrival_date == 0 || self.arrival_date > days {
            return Err(BookingError::InvalidDay {
                month: self.arrival_month,
                day: self.arrival_date,
            });
        }
        if !self.avg_price_per_room.is_finite() || self.avg_price_per_room < 0.0 {
            return Err(BookingError::InvalidPrice(self.avg_price_per_room));
        }
        Ok(())
    }
}

/// Names of the submitted form fields, one per [`BookingInput`] field.
pub const FORM_FIELDS: [&str; 17] = [
    "no_of_adults",
    "no_of_children",
    "no_of_weekend_nights",
    "no_of_week_nights",
    "required_car_parking_space",
    "lead_time",
    "arrival_year",
    "arrival_month",
    "arrival_date",
    "repeated_guest",
    "no_of_previous_cancellations",
    "no_of_previous_bookings_not_canceled",
    "avg_price_per_room",
    "no_of_special_requests",
    "meal_plan",
    "room_type",
    "market_segment",
];

fn parse_value<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, BookingError> {
    value.trim().parse().map_err(|_| BookingError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_choice<C: Choice>(field: &'static str, value: &str) -> Result<C, BookingError> {
    C::ALL
        .iter()
        .copied()
        .find(|c| c.label() == value)
        .ok_or_else(|| BookingError::InvalidField {
            field,
            value: value.to_string(),
        })
}

impl BookingInput {
    /// Builds a booking from raw `name=value` form pairs.
    ///
    /// Every field that parses is kept even when another one does not, so the
    /// form can be shown again with what the user typed. The first offending
    /// field is reported.
    pub fn from_form_pairs(pairs: &[(String, String)]) -> (Self, Result<(), BookingError>) {
        let mut booking = Self::default();
        let mut first_error = None;
        for (name, value) in pairs {
            if let Err(err) = booking.set_field(name, value) {
                first_error.get_or_insert(err);
            }
        }
        if first_error.is_none() {
            first_error = FORM_FIELDS
                .iter()
                .copied()
                .find(|field| !pairs.iter().any(|(name, _)| name.as_str() == *field))
                .map(BookingError::MissingField);
        }
        (booking, first_error.map_or(Ok(()), Err))
    }

    // Unknown names are ignored.
    fn set_field(&mut self, name: &str, value: &str) -> Result<(), BookingError> {
        match name {
            "no_of_adults" => self.no_of_adults = parse_value("no_of_adults", value)?,
            "no_of_children" => self.no_of_children = parse_value("no_of_children", value)?,
            "no_of_weekend_nights" => {
                self.no_of_weekend_nights = parse_value("no_of_weekend_nights", value)?
            }
            "no_of_week_nights" => {
                self.no_of_week_nights = parse_value("no_of_week_nights", value)?
            }
            "required_car_parking_space" => {
                self.required_car_parking_space =
                    parse_choice("required_car_parking_space", value)?
            }
            "lead_time" => self.lead_time = parse_value("lead_time", value)?,
            "arrival_year" => self.arrival_year = parse_value("arrival_year", value)?,
            "arrival_month" => self.arrival_month = parse_value("arrival_month", value)?,
            "arrival_date" => self.arrival_date = parse_value("arrival_date", value)?,
            "repeated_guest" => self.repeated_guest = parse_choice("repeated_guest", value)?,
            "no_of_previous_cancellations" => {
                self.no_of_previous_cancellations =
                    parse_value("no_of_previous_cancellations", value)?
            }
            "no_of_previous_bookings_not_canceled" => {
                self.no_of_previous_bookings_not_canceled =
                    parse_value("no_of_previous_bookings_not_canceled", value)?
            }
            "avg_price_per_room" => {
                self.avg_price_per_room = parse_value("avg_price_per_room", value)?
            }
            "no_of_special_requests" => {
                self.no_of_special_requests = parse_value("no_of_special_requests", value)?
            }
            "meal_plan" => self.meal_plan = parse_choice("meal_plan", value)?,
            "room_type" => self.room_type = parse_choice("room_type", value)?,
            "market_segment" => self.market_segment = parse_choice("market_segment", value)?,
            _ => {}
        }
        Ok(())
    }
}

// February is always offered with 28 days.
fn days_in_month(month: u32) -> Result<u32, BookingError> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 => Ok(28),
        _ => Err(BookingError::InvalidMonth(month)),
    }
}

pub fn arrival_day_options(month: u32) -> Result<Vec<u32>, BookingError> {
    Ok((1..=days_in_month(month)?).collect())
}
