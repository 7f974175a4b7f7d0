//! Wire and snapshot models for the voting-records API
//!
//! The same types are used to decode API responses and to persist the local
//! snapshot files, so unknown upstream fields are kept where the snapshot is
//! meant to be a mirror.

mod division;
mod member;

pub use division::{Ballot, Division, DivisionSummary, House, MemberRef, PersonRef, VoteRecord};
pub use member::{AdditionalInfo, LatestMembership, Member, Office, PersonName, RawMember};
