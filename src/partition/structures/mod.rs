mod bucket_set;
mod partition_set;

pub(crate) use bucket_set::BucketSet;
pub(crate) use partition_set::PartitionSet;
