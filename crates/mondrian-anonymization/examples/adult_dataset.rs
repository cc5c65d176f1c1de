use mondrian_anonymization::{Anonymizer, Hierarchy, HierarchyDefinition, QuasiIdentifier, Record};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::{sync::Arc, time::Instant};

fn hierarchy(name: &str, definition: HierarchyDefinition) -> anyhow::Result<Arc<Hierarchy>> {
    Ok(Arc::new(Hierarchy::new(name, &definition)?))
}

fn main() -> anyhow::Result<()> {
    let gender = HierarchyDefinition::with_leaves("Gender", ["Male", "Female"]);

    let marital_status = HierarchyDefinition::node(
        "Marital-Status",
        vec![
            HierarchyDefinition::with_leaves(
                "Unmarried",
                ["Never-married", "Divorced", "Separated", "Widowed"],
            ),
            HierarchyDefinition::with_leaves(
                "Married",
                ["Married-civ-spouse", "Married-spouse-absent", "Married-AF-spouse"],
            ),
        ],
    );

    let education = HierarchyDefinition::node(
        "Education",
        vec![
            HierarchyDefinition::with_leaves(
                "Low",
                ["Preschool", "1st-4th", "5th-6th", "7th-8th", "9th", "10th", "11th", "12th"],
            ),
            HierarchyDefinition::with_leaves(
                "Medium",
                ["HS-grad", "Some-college", "Assoc-acdm", "Assoc-voc", "Prof-school"],
            ),
            HierarchyDefinition::with_leaves("High", ["Bachelors", "Masters", "Doctorate"]),
        ],
    );

    let country = HierarchyDefinition::node(
        "World",
        vec![
            HierarchyDefinition::with_leaves("North-America", ["Canada", "Mexico", "United-States"]),
            HierarchyDefinition::with_leaves("Centre-South-America", ["Cuba", "Jamaica", "Peru"]),
            HierarchyDefinition::with_leaves("Asia", ["China", "India", "Japan", "Vietnam"]),
            HierarchyDefinition::with_leaves("Europe", ["England", "France", "Germany", "Italy"]),
        ],
    );

    let leaves = |definition: &HierarchyDefinition| -> Vec<String> {
        let mut leaves = vec![];
        let mut stack = vec![definition];
        while let Some(node) = stack.pop() {
            if node.children.is_empty() {
                leaves.push(node.label.clone());
            }
            stack.extend(node.children.iter());
        }
        leaves
    };

    let genders = leaves(&gender);
    let statuses = leaves(&marital_status);
    let educations = leaves(&education);
    let countries = leaves(&country);

    let anonymizer = Anonymizer::new(
        10,
        vec![
            QuasiIdentifier::categorical("gender", hierarchy("gender", gender)?),
            QuasiIdentifier::numerical("age"),
            QuasiIdentifier::categorical("country", hierarchy("country", country)?),
            QuasiIdentifier::categorical("education", hierarchy("education", education)?),
            QuasiIdentifier::categorical("marital_status", hierarchy("marital_status", marital_status)?),
        ],
        vec!["income".to_string()],
    )?;

    let mut rng = StdRng::seed_from_u64(2021);
    let records: Vec<Record> = (0..2000)
        .map(|id| {
            Record::new(id)
                .with_quasi_identifier("gender", genders.choose(&mut rng).unwrap().as_str())
                .with_quasi_identifier("age", rng.gen_range(17..90_i64))
                .with_quasi_identifier("country", countries.choose(&mut rng).unwrap().as_str())
                .with_quasi_identifier("education", educations.choose(&mut rng).unwrap().as_str())
                .with_quasi_identifier("marital_status", statuses.choose(&mut rng).unwrap().as_str())
                .with_sensitive("income", if rng.gen_bool(0.25) { ">50K" } else { "<=50K" })
        })
        .collect();

    let before = Instant::now();
    let anonymization = anonymizer.anonymize(&records)?;
    println!("Anonymized {} records in {:.2?}", records.len(), before.elapsed());
    println!("{:?}", anonymization.summary());

    for class in anonymization.classes.iter().take(12) {
        println!(
            "#{:<4} size {:<3} {:?}",
            class.partition_id,
            class.len(),
            class.generalized
        );
    }

    Ok(())
}
