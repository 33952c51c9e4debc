pub mod iata;
pub mod travel;

pub use iata::resolve_iata;
pub use travel::{
    convert_currency, AmadeusClient, DataUnavailable, OfflineTravelData, TravelData,
    DATA_NOT_FOUND,
};
