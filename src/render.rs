// src/render.rs

/// `surface<TAB>cluster_id` lines in input order.
pub fn render_clusters_tsv(pairs: &[(String, usize)]) -> String {
    let mut out = String::new();
    for (surface, id) in pairs {
        out.push_str(&format!("{}\t{}\n", surface, id));
    }
    out
}
