pub mod ball_tree;
pub mod brute_force;
pub mod centroid;
pub mod classifier;
pub mod distance;
pub mod heap_utils;

pub use ball_tree::{BallNodeContents, BallTree, BallTreeConfig, BallTreeNode, SearchStats};
pub use centroid::NearestCentroid;
pub use classifier::{majority_vote, KnnClassifier, SearchStrategy};
pub use distance::{KnnDistance, Metric};
