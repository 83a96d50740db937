//! Infrastructure adapters that sit outside the feature layer

pub mod storage;
