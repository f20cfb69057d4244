use crate::domain::entities::BannerRecord;

/// Select the banners of one group, keeping their original order.
pub fn filter_by_group(banners: &[BannerRecord], group_id: &str) -> Vec<BannerRecord> {
    banners
        .iter()
        .filter(|banner| banner.group_id == group_id)
        .cloned()
        .collect()
}
