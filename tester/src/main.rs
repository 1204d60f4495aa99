use std::fs;

const SAMPLES: &[(&str, &[&str])] = &[
    (
        "aeon",
        &[
            "0x1111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222, early-supporter",
        ],
    ),
    (
        "sproto",
        &[
            "0x3333333333333333333333333333333333333333",
            // also on the aeon roster, exercises the index union
            "0x2222222222222222222222222222222222222222",
        ],
    ),
    (
        "spx",
        &[
            "0x4444444444444444444444444444444444444444",
            "not-an-address",
            "0xDEADBEEF",
        ],
    ),
    ("mog", &["0x5555555555555555555555555555555555555555"]),
    ("milady", &["0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD"]),
    ("hpos", &[]),
];

fn main() {
    fs::create_dir_all("../data").unwrap();

    for (community, lines) in SAMPLES {
        let path = format!("../data/{community}.txt");
        let mut contents = lines.join("\n");
        contents.push('\n');

        fs::write(&path, contents).unwrap();
        println!("Wrote {path} ({} lines)", lines.len());
    }
}
