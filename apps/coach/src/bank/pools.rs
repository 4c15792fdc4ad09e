//! Built-in question data. Pools are deliberately simple; they are content,
//! not a calibrated assessment.

/// (prompt, options, correct option index)
pub type RawQuestion = (&'static str, &'static [&'static str], usize);

pub const TECH: &[RawQuestion] = &[
    ("What is a Decorator in Python?", &["A design pattern", "A function modifying another function", "A database trigger"], 1),
    ("Difference between LIST and TUPLE?", &["Mutable vs Immutable", "No difference", "List is slower"], 0),
    ("What does SQL injection target?", &["The database", "The frontend", "The network"], 0),
    ("What is the complexity of Binary Search?", &["O(n)", "O(log n)", "O(1)"], 1),
    ("Which data structure uses LIFO?", &["Queue", "Stack", "Array"], 1),
    ("What is a REST API?", &["A database", "A design style for web APIs", "A programming language"], 1),
    ("What is Git primarily used for?", &["Code compilation", "Version control", "Database management"], 1),
    ("Explain 'Big O' notation.", &["Code size", "Algorithm efficiency", "Variable naming"], 1),
    ("What is a primary key?", &["Main file", "Unique database identifier", "Security password"], 1),
    ("Which is a frontend framework?", &["Django", "React", "Flask"], 1),
];

pub const APTITUDE: &[RawQuestion] = &[
    ("Choose the synonym of: HAPPY", &["Sad", "Joyful", "Angry"], 1),
    ("Next number: 2, 4, 8, ...", &["12", "16", "24"], 1),
    ("Train moving at 60km/h crosses a pole in 9s. Length?", &["150m", "100m", "120m"], 0),
    ("If A is brother of B, B is sister of C...", &["C is father", "C is sibling", "Unrelated"], 1),
    ("Odd one out: 3, 5, 7, 9, 11", &["9", "7", "3"], 0),
    ("A person sells an item for $120 making 20% profit. Cost price?", &["$100", "$96", "$110"], 0),
    ("What is 15% of 200?", &["25", "30", "35"], 1),
    ("Simplify: (4 + 8) / 2 x 3", &["6", "18", "12"], 1),
];

pub const AI: &[RawQuestion] = &[
    ("What is the goal of AI?", &["To simulate human intelligence", "To build faster computers", "To store more data"], 0),
    ("Which is a search algorithm?", &["A*", "B-Tree", "QuickSort"], 0),
    ("What is a Heuristic?", &["A rule of thumb", "A precise formula", "A database key"], 0),
    ("Turing Test evaluates?", &["Machine Intelligence", "Hardware Speed", "Network Latency"], 0),
    ("Example of Weak AI?", &["Siri", "Data from Star Trek", "Skynet"], 0),
    ("What is Natural Language Processing?", &["Data compression", "Understanding human speech", "Image editing"], 1),
    ("Which is an AI subfield?", &["Cloud Computing", "Machine Learning", "Blockchain"], 1),
];

pub const ML: &[RawQuestion] = &[
    ("Supervised Learning requires?", &["Labeled data", "Unlabeled data", "No data"], 0),
    ("What is Overfitting?", &["Model learns noise", "Model is too simple", "Data is missing"], 0),
    ("Which is a classifier?", &["SVM", "K-Means", "PCA"], 0),
    ("What is a Neural Network?", &["A physical brain", "Computational model for patterns", "Storage device"], 1),
    ("Which is used for dimensionality reduction?", &["Random Forest", "PCA", "Linear Regression"], 1),
];

pub const VLSI: &[RawQuestion] = &[
    ("What does VLSI stand for?", &["Very Large Scale Integration", "Value Line Scale Input", "Virtual Long Scale Interface"], 0),
    ("Which tool is for circuit simulation?", &["Spice", "Photoshop", "Notepad"], 0),
    ("What is a MOSFET?", &["Type of resistor", "Field-effect transistor", "Logic gate"], 1),
    ("Law stating transistor count doubles every 2 years?", &["Moore's Law", "Newton's Law", "Ohm's Law"], 0),
];

pub const EMBEDDED: &[RawQuestion] = &[
    ("What defines an Embedded System?", &["Single purpose computer", "General purpose PC", "Large server"], 0),
    ("Common Embedded language?", &["C/C++", "HTML", "PHP"], 0),
    ("What is an RTOS?", &["Real-time Operating System", "Regional Task Office", "Root Task Online"], 0),
    ("What is a Microcontroller?", &["Mini computer on a chip", "Large monitor", "Storage drive"], 0),
];

/// Category key → raw pool. The first two are the fixed assessment stages.
pub const CATEGORIES: &[(&str, &[RawQuestion])] = &[
    ("tech", TECH),
    ("apt", APTITUDE),
    ("AI", AI),
    ("ML", ML),
    ("VLSI", VLSI),
    ("Embedded", EMBEDDED),
];

/// Behavioral prompts: (prompt, keywords).
pub const HR: &[(&str, &[&str])] = &[
    ("Tell me about a time you handled a conflict.", &["listen", "compromise", "understand", "calm"]),
    ("Why should we hire you?", &["passionate", "skill", "fit", "value"]),
    ("Where do you see yourself in 5 years?", &["growth", "learning", "lead", "expert"]),
];
