use serde::Deserialize;

// Only the fields we use are declared; the services also echo `name` and `count`.

/// The response of the gender service. `gender` is `null` for unknown names.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderResponse {
    pub gender: Option<String>,
}

/// The response of the age service. `age` is `null` for unknown names.
#[derive(Debug, Clone, Deserialize)]
pub struct AgeResponse {
    pub age: Option<i32>,
}

/// The response of the nationality service, guesses ordered by probability.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalityResponse {
    #[serde(default)]
    pub country: Vec<CountryGuess>,
}

/// A single country guess.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryGuess {
    pub country_id: String,
    #[serde(default)]
    pub probability: f64,
}
