use super::types::{default_percent_threshold, FieldPositions, FieldSynonyms, KpiSchema, KpiSlot};

impl KpiSchema {
    /// Plant-floor layout: plan attainment, efficiency and lost time.
    pub fn plan_vs_actual() -> Self {
        Self::with_kpis(vec![
            KpiSlot::new("PLAN VS ACTUAL")
                .with_aliases(&["plan v actual", "plan/actual", "plan attainment"])
                .with_demo(72.0, 75.0),
            KpiSlot::new("EFFICIENCY").with_demo(68.0, 80.0),
            KpiSlot::new("LOST TIME")
                .with_aliases(&["downtime", "lost hours"])
                .with_demo(12.0, 10.0),
        ])
    }

    /// Productivity layout with an explicit variance card.
    pub fn productivity() -> Self {
        Self::with_kpis(vec![
            KpiSlot::new("PRODUCTIVITY").with_demo(84.0, 90.0),
            KpiSlot::new("EFFICIENCY").with_demo(68.0, 80.0),
            KpiSlot::new("VARIANCE FROM TARGET")
                .with_aliases(&["variance to target", "target variance"])
                .with_demo(-6.0, 0.0),
        ])
    }

    /// Looks up a built-in layout by name (`plan_vs_actual`, `productivity`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "plan_vs_actual" | "plan" => Some(Self::plan_vs_actual()),
            "productivity" => Some(Self::productivity()),
            _ => None,
        }
    }

    /// Default synonyms, positions and scaling around the given KPI list.
    pub fn with_kpis(kpis: Vec<KpiSlot>) -> Self {
        Self {
            kpis,
            synonyms: FieldSynonyms::default(),
            positions: FieldPositions::default(),
            percent_threshold: default_percent_threshold(),
        }
    }
}

impl Default for KpiSchema {
    fn default() -> Self {
        Self::plan_vs_actual()
    }
}
