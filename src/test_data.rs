#[cfg(test)]
pub const POST_DATA_MD: &str = r##"---
title: What I learned after 20+ years of software development
description: Advice I would give my younger self
date: 2022-04-02 12:05:00.000
tags: [career, programming]
---

How to be a great software engineer?

Someone asked me this question today and I didn't have an answer. ![me](me.png)

<!-- more -->

## Non technical

### Have a honest image of yourself

You finished university and learned a lot. __The earlier you find that, the better.__
"##;

#[cfg(test)]
pub const POST_DATA_HTML: &str = r##"---
date: 2024-02-16 08:00
tags: linux
draft: true
---
<h1>Creating a daemon in systemd</h1>
<p>So, you created your awesome server-side application.</p>
<img src="unit.png">
<!-- more -->
<h2>The unit file</h2>
"##;
