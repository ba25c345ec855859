//! The `triscale init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("reference-table.csv").exists() {
        println!("reference-table.csv already exists, skipping.");
    } else {
        std::fs::write("reference-table.csv", STARTER_TABLE)?;
        println!("Created reference-table.csv");
    }

    if std::path::Path::new("cohort.json").exists() {
        println!("cohort.json already exists, skipping.");
    } else {
        std::fs::write("cohort.json", EXAMPLE_COHORT)?;
        println!("Created cohort.json");
    }

    println!("\nNext steps:");
    println!("  1. Replace reference-table.csv with your historical TRI bands");
    println!("  2. Fill cohort.json with the answer key and student responses");
    println!("  3. Run: triscale validate --table reference-table.csv --cohort cohort.json");
    println!("  4. Run: triscale score --table reference-table.csv --cohort cohort.json");

    Ok(())
}

// A deliberately coarse starter table. Real tables carry one row per
// correct count, built from historical exam data.
const STARTER_TABLE: &str = "\
area;acertos;tri_min;tri_med;tri_max
LC;0;299,6;299,6;299,6
LC;10;370,0;400,0;430,0
LC;20;440,0;480,0;520,0
LC;30;530,0;580,0;630,0
LC;40;640,0;700,0;760,0
LC;45;700,0;760,0;790,0
CH;0;329,8;329,8;329,8
CH;10;380,0;410,0;440,0
CH;20;450,0;490,0;530,0
CH;30;540,0;590,0;640,0
CH;40;650,0;710,0;770,0
CH;45;710,0;770,0;820,0
CN;0;339,9;339,9;339,9
CN;10;390,0;420,0;450,0
CN;20;460,0;500,0;540,0
CN;30;560,0;610,0;660,0
CN;40;680,0;740,0;800,0
CN;45;740,0;800,0;870,0
MT;0;342,8;342,8;342,8
MT;10;400,0;430,0;460,0
MT;20;480,0;520,0;560,0
MT;30;590,0;640,0;690,0
MT;40;730,0;790,0;850,0
MT;45;800,0;870,0;980,0
";

const EXAMPLE_COHORT: &str = r#"{
  "answer_key": {
    "1": "A", "2": "B", "3": "C", "4": "D", "5": "E"
  },
  "areas": {
    "LC": [1, 2],
    "CH": [3, 3],
    "CN": [4, 4],
    "MT": [5, 5]
  },
  "students": [
    {
      "id": "stu-001",
      "name": "Example Student",
      "answers": { "1": "A", "2": "C", "3": "C", "4": "D", "5": "B" }
    }
  ]
}
"#;
