pub mod roster_refresher;
