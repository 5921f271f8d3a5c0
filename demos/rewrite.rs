//! End-to-end example: CoNLL-U → Rewriter → labels and firing log
//!
//! This example demonstrates the full pipeline:
//! 1. Parse CoNLL-U text into Trees
//! 2. Rewrite every occurrence of a focus word
//! 3. Display the rewritten tree, labels and rules that fired
//!
//! Run with: RUST_LOG=treerewrite=debug cargo run --example rewrite

use tracing_subscriber::EnvFilter;
use treerewrite::{CoNLLUReader, Rewriter};

const FOCUS: &str = "improves";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("treerewrite=info")),
        )
        .init();

    let conllu_text = "# sent_id = relcl
# text = a research area which continuously improves web search relevance
1\ta\ta\tDET\tDT\t_\t3\tdet\t_\t_
2\tresearch\tresearch\tNOUN\tNN\t_\t3\tcompound\t_\t_
3\tarea\tarea\tNOUN\tNN\t_\t0\tROOT\t_\t_
4\twhich\twhich\tDET\tWDT\t_\t6\tnsubj\t_\t_
5\tcontinuously\tcontinuously\tADV\tRB\t_\t6\tadvmod\t_\t_
6\timproves\timprove\tVERB\tVBZ\t_\t3\trelcl\t_\t_
7\tweb\tweb\tNOUN\tNN\t_\t9\tcompound\t_\t_
8\tsearch\tsearch\tNOUN\tNN\t_\t9\tcompound\t_\t_
9\trelevance\trelevance\tNOUN\tNN\t_\t6\tdobj\t_\t_

# sent_id = merge
# text = Another partitional method ORCLUS improves PROCLUS .
1\tAnother\tanother\tDET\tDT\t_\t3\tdet\t_\t_
2\tpartitional\tpartitional\tADJ\tJJ\t_\t3\tamod\t_\t_
3\tmethod\tmethod\tNOUN\tNN\t_\t5\tnsubj\t_\t_
4\tORCLUS\tORCLUS\tPROPN\tNNP\t_\t5\tnsubj\t_\t_
5\timproves\timprove\tVERB\tVBZ\t_\t0\tROOT\t_\t_
6\tPROCLUS\tPROCLUS\tPROPN\tNNP\t_\t5\tdobj\t_\t_
7\t.\t.\tPUNCT\t.\t_\t5\tpunct\t_\t_

# sent_id = conj
# text = the model helps recover the errors and improves accuracy
1\tthe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tmodel\tmodel\tNOUN\tNN\t_\t3\tnsubj\t_\t_
3\thelps\thelp\tVERB\tVBZ\t_\t0\tROOT\t_\t_
4\trecover\trecover\tVERB\tVB\t_\t3\txcomp\t_\t_
5\tthe\tthe\tDET\tDT\t_\t6\tdet\t_\t_
6\terrors\terror\tNOUN\tNNS\t_\t4\tdobj\t_\t_
7\tand\tand\tCCONJ\tCC\t_\t3\tcc\t_\t_
8\timproves\timprove\tVERB\tVBZ\t_\t3\tconj\t_\t_
9\taccuracy\taccuracy\tNOUN\tNN\t_\t8\tdobj\t_\t_

";

    println!("=== Treerewrite: End-to-End Example ===\n");

    let rewriter = Rewriter::default();

    for result in CoNLLUReader::from_str(conllu_text) {
        let tree = match result {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("Parse error: {}", e);
                return;
            }
        };

        let sent_id = tree.metadata.get("sent_id").map_or("?", String::as_str);
        println!("--- {} ---", sent_id);
        if let Some(text) = &tree.sentence_text {
            println!("Text:   {}", text);
        }
        if let Some(root) = tree.root() {
            println!("Before: {}", tree.to_bracketed(root));
        }

        let rewrites = match rewriter.rewrite_occurrences(&tree, FOCUS) {
            Ok(rewrites) => rewrites,
            Err(e) => {
                eprintln!("Rewrite error: {}", e);
                continue;
            }
        };

        for rewrite in &rewrites {
            let outcome = &rewrite.outcome;
            println!("After:  {}", rewrite.tree.to_bracketed(outcome.root));
            println!("Labels: {}", outcome.labels.sorted().join(", "));
            if outcome.firings.is_empty() {
                println!("Rules:  (none)");
            } else {
                println!("Rules:  {}", outcome.firings.as_slice().join(" → "));
            }
        }
        println!();
    }
}
