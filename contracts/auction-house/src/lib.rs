//! A reserve price auction house for CIS-2 tokens.
//!
//! Anyone can put a token under the hammer with `createAuction`; the house
//! pulls it into escrow and holds it for the lifetime of the auction. Bids
//! are placed in CCD or in a CIS-2 currency chosen by the seller, the
//! countdown only starts with the first bid, and a bid landing close to the
//! deadline pushes the deadline back so every auction ends with a quiet
//! window. Once the deadline has passed, anyone may call `endAuction`: the
//! token goes to the winner, the curator cut is paid out and the seller
//! receives the rest.
//!
//! A token contract that misbehaves at settlement cannot hold the winner's
//! funds hostage. The winner is refunded, the token is parked in a grave
//! under its auction id and the seller can pull it out later with `recover`.
#![cfg_attr(not(feature = "std"), no_std)]

use commons::*;
use concordium_cis2::*;
use concordium_std::*;

mod contract;
mod events;
mod external;
mod state;

pub use crate::{contract::*, events::*, external::*, state::*};

/// Auctions are numbered in creation order, starting from 0. Ids of settled
/// and cancelled auctions are never reused.
pub type AuctionId = u64;

/// A bid landing closer to the deadline than this pushes the deadline back
/// until the remaining window is this long again.
pub const TIME_BUFFER_MILLIS: u64 = 15 * 60 * 1_000;

/// A bid must exceed the standing bid by at least this share of it.
pub const MIN_BID_INCREMENT: Percentage = Percentage::from_percent(5);
