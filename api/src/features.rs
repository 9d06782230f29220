//! One-hot encoding of a [`BookingInput`] into the classifier's column layout.

use serde::Serialize;

use crate::booking::{BookingInput, Choice, MarketSegment, MealPlan, RoomType};

pub const NUM_FEATURES: usize = 30;

/// Column names in the order the model was trained on.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
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
    "type_of_meal_plan_Meal Plan 1",
    "type_of_meal_plan_Meal Plan 2",
    "type_of_meal_plan_Meal Plan 3",
    "type_of_meal_plan_Not Selected",
    "room_type_reserved_Room_Type 1",
    "room_type_reserved_Room_Type 2",
    "room_type_reserved_Room_Type 3",
    "room_type_reserved_Room_Type 4",
    "room_type_reserved_Room_Type 5",
    "room_type_reserved_Room_Type 6",
    "room_type_reserved_Room_Type 7",
    "market_segment_type_Aviation",
    "market_segment_type_Complementary",
    "market_segment_type_Corporate",
    "market_segment_type_Offline",
    "market_segment_type_Online",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f32; NUM_FEATURES],
}

#[derive(Debug, Serialize)]
pub struct NamedFeature {
    pub name: &'static str,
    pub value: f32,
}

impl FeatureVector {
    pub fn names() -> &'static [&'static str] {
        &FEATURE_NAMES
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = NamedFeature> + '_ {
        FEATURE_NAMES
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| NamedFeature {
                name: *name,
                value: *value,
            })
    }
}

/// Writes one flag per option of `C`, set only for `selected`.
fn push_one_hot<C: Choice>(out: &mut Vec<f32>, selected: C) {
    out.extend(C::ALL.iter().map(|c| if *c == selected { 1.0 } else { 0.0 }));
}

pub fn encode(booking: &BookingInput) -> FeatureVector {
    let mut values = Vec::with_capacity(NUM_FEATURES);
    values.extend([
        booking.no_of_adults as f32,
        booking.no_of_children as f32,
        booking.no_of_weekend_nights as f32,
        booking.no_of_week_nights as f32,
        booking.required_car_parking_space.flag() as f32,
        booking.lead_time as f32,
        booking.arrival_year as f32,
        booking.arrival_month as f32,
        booking.arrival_date as f32,
        booking.repeated_guest.flag() as f32,
        booking.no_of_previous_cancellations as f32,
        booking.no_of_previous_bookings_not_canceled as f32,
        booking.avg_price_per_room as f32,
        booking.no_of_special_requests as f32,
    ]);
    // "No Need Meal" is the last option and lands on the "Not Selected" column.
    push_one_hot::<MealPlan>(&mut values, booking.meal_plan);
    push_one_hot::<RoomType>(&mut values, booking.room_type);
    push_one_hot::<MarketSegment>(&mut values, booking.market_segment);

    let mut out = [0.0; NUM_FEATURES];
    out.copy_from_slice(&values);
    FeatureVector { values: out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::YesNo;

    fn group_sum(features: &FeatureVector, prefix: &str) -> f32 {
        features
            .iter()
            .filter(|f| f.name.starts_with(prefix))
            .map(|f| f.value)
            .sum()
    }

    #[test]
    fn raw_attributes_are_copied_in_order() {
        let booking = BookingInput {
            no_of_adults: 2,
            no_of_children: 1,
            no_of_weekend_nights: 3,
            no_of_week_nights: 4,
            required_car_parking_space: YesNo::Yes,
            lead_time: 85,
            arrival_year: 2018,
            arrival_month: 7,
            arrival_date: 21,
            repeated_guest: YesNo::No,
            no_of_previous_cancellations: 1,
            no_of_previous_bookings_not_canceled: 5,
            avg_price_per_room: 106.68,
            no_of_special_requests: 2,
            ..BookingInput::default()
        };
        let features = encode(&booking);
        assert_eq!(
            &features.values()[..14],
            &[2.0, 1.0, 3.0, 4.0, 1.0, 85.0, 2018.0, 7.0, 21.0, 0.0, 1.0, 5.0, 106.68_f64 as f32, 2.0]
        );
    }

    #[test]
    fn exactly_one_flag_per_group() {
        for plan in MealPlan::ALL {
            for room in RoomType::ALL {
                for segment in MarketSegment::ALL {
                    let booking = BookingInput {
                        meal_plan: *plan,
                        room_type: *room,
                        market_segment: *segment,
                        ..BookingInput::default()
                    };
                    let features = encode(&booking);
                    assert_eq!(group_sum(&features, "type_of_meal_plan_"), 1.0);
                    assert_eq!(group_sum(&features, "room_type_reserved_"), 1.0);
                    assert_eq!(group_sum(&features, "market_segment_type_"), 1.0);
                }
            }
        }
    }

    #[test]
    fn no_need_meal_sets_not_selected_column() {
        let booking = BookingInput {
            meal_plan: MealPlan::NoNeedMeal,
            ..BookingInput::default()
        };
        let features = encode(&booking);
        assert_eq!(features.get("type_of_meal_plan_Not Selected"), Some(1.0));
        assert_eq!(features.get("type_of_meal_plan_Meal Plan 1"), Some(0.0));
    }

    #[test]
    fn selected_options_map_to_their_columns() {
        let booking = BookingInput {
            meal_plan: MealPlan::MealPlan2,
            room_type: RoomType::RoomType6,
            market_segment: MarketSegment::Online,
            ..BookingInput::default()
        };
        let features = encode(&booking);
        assert_eq!(features.get("type_of_meal_plan_Meal Plan 2"), Some(1.0));
        assert_eq!(features.get("room_type_reserved_Room_Type 6"), Some(1.0));
        assert_eq!(features.get("room_type_reserved_Room_Type 1"), Some(0.0));
        assert_eq!(features.get("market_segment_type_Online"), Some(1.0));
        assert_eq!(features.get("market_segment_type_Aviation"), Some(0.0));
        assert_eq!(features.get("unknown"), None);
    }

    #[test]
    fn layout_has_unique_names() {
        let mut names = FeatureVector::names().to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NUM_FEATURES);
    }
}
