mod account;
pub use account::{Account, AccountType, AccountTypes, Close, Open};

mod book;

pub mod defaults;

mod errors;
pub use errors::{BookingError, PostingBookingError, TransactionBookingError};

mod inventory;
pub use inventory::{Inventory, Position};

mod load;
pub use load::{AccountPosting, DatedPosting, Ledger, Transaction};

mod parsed;

mod plugins;

mod prices;
pub use prices::{PriceMap, Quote};

mod types;
pub use types::{Booking, Cost, Posting, Price, is_supported_method};
